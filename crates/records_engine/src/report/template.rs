use records_core::{FieldValue, Record};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Letterhead {
    pub organization: String,
    pub address_lines: Vec<String>,
    pub contact_lines: Vec<String>,
}

impl Default for Letterhead {
    fn default() -> Self {
        Self {
            organization: "Sobha Plantation".to_string(),
            address_lines: vec![
                "317/23, Nikaweratiya,".to_string(),
                "Kurunagala, Sri Lanka.".to_string(),
            ],
            contact_lines: vec![
                "Email: sobhaplantationsltd@gmail.com".to_string(),
                "Contact: 0112 751 757".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFormat {
    Text,
    /// Rendered as `YYYY-MM-DD`.
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportColumn {
    pub title: String,
    pub field: String,
    pub format: ColumnFormat,
}

impl ReportColumn {
    pub fn text(title: &str, field: &str) -> Self {
        Self {
            title: title.to_string(),
            field: field.to_string(),
            format: ColumnFormat::Text,
        }
    }

    pub fn date(title: &str, field: &str) -> Self {
        Self {
            title: title.to_string(),
            field: field.to_string(),
            format: ColumnFormat::Date,
        }
    }

    /// Cell text for `record`; missing fields render empty, unparseable dates
    /// render as stored.
    pub fn cell(&self, record: &Record) -> String {
        match (self.format, record.field(&self.field)) {
            (_, None) | (_, Some(FieldValue::Null)) => String::new(),
            (ColumnFormat::Date, Some(value)) => value
                .as_date()
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| value.to_search_text()),
            (ColumnFormat::Text, Some(value)) => value.to_search_text(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTemplate {
    pub letterhead: Letterhead,
    pub title: String,
    pub columns: Vec<ReportColumn>,
    pub file_name: String,
}

impl ReportTemplate {
    pub fn maintenance() -> Self {
        Self {
            letterhead: Letterhead::default(),
            title: "Maintenance Records Report".to_string(),
            columns: vec![
                ReportColumn::date("Date Referred", "reffereddate"),
                ReportColumn::text("Equipment", "eqname"),
                ReportColumn::text("Quantity", "quantity"),
                ReportColumn::text("Referred Location", "referredlocation"),
                ReportColumn::date("Received Date", "receiveddate"),
                ReportColumn::text("Status", "status"),
            ],
            file_name: "maintenance_records_report.pdf".to_string(),
        }
    }
}
