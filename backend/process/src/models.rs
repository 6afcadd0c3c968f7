use spots::SpotForm;

/// `name, area, station, walkMinutes, address, placeType, lines, description, imageFileName, safetyNote`
pub const REQUIRED_COLUMNS: usize = 9;

/// One row of the bulk import sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvSpot {
    pub name: String,
    pub area: String,
    pub station: String,
    pub walk_minutes: String,
    pub address: String,
    pub place_type: String,
    pub lines: String,
    pub description: String,
    pub image_file_name: String,
    pub safety_note: String,
}

impl CsvSpot {
    pub fn from_columns(columns: Vec<String>) -> Option<Self> {
        if columns.len() < REQUIRED_COLUMNS {
            return None;
        }

        let mut columns = columns.into_iter().map(|column| column.trim().to_string());
        let mut next = || columns.next().unwrap_or_default();

        Some(Self {
            name: next(),
            area: next(),
            station: next(),
            walk_minutes: next(),
            address: next(),
            place_type: next(),
            lines: next(),
            description: next(),
            image_file_name: next(),
            safety_note: next(),
        })
    }

    pub fn into_form(self) -> SpotForm {
        SpotForm {
            name: self.name,
            area: self.area,
            station: self.station,
            walk_minutes: self.walk_minutes,
            address: self.address,
            description: self.description,
            place_type: self.place_type,
            lines: self.lines,
            safety_note: self.safety_note,
        }
    }
}
