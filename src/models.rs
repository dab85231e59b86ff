use std::fmt;

use crate::error::InquiryError;

/// Column names the trained pipeline was fitted on, in training order.
/// Spelling is significant, including the trailing space on `average price `.
pub const COLUMNS: [&str; 15] = [
    "number of adults",
    "number of children",
    "number of weekend nights",
    "number of week nights",
    "type of meal",
    "car parking space",
    "room type",
    "lead time",
    "market segment type",
    "repeated",
    "P-C",
    "P-not-C",
    "average price ",
    "special requests",
    "date of reservation",
];

pub const MEAL_PLANS: [&str; 4] = ["Meal Plan 1", "Meal Plan 2", "Meal Plan 3", "Not Selected"];
pub const ROOM_TYPES: [&str; 4] = ["Room_Type 1", "Room_Type 2", "Room_Type 3", "Room_Type 4"];
pub const MARKET_SEGMENTS: [&str; 3] = ["Offline", "Online", "Corporate"];

/// One hotel reservation scenario, the unit of prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingInquiry {
    pub number_of_adults: i64,
    pub number_of_children: i64,
    pub number_of_weekend_nights: i64,
    pub number_of_week_nights: i64,
    pub type_of_meal: String,
    pub car_parking_space: i64,
    pub room_type: String,
    pub lead_time: i64,
    pub market_segment_type: String,
    pub repeated: i64,
    pub p_c: i64,
    pub p_not_c: i64,
    pub average_price: f64,
    pub special_requests: i64,
    pub date_of_reservation: String,
}

/// A single cell handed to the model.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Value kind a column carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Text => "string",
        })
    }
}

impl FieldValue {
    pub fn kind(&self) -> ColumnKind {
        match self {
            FieldValue::Int(_) => ColumnKind::Integer,
            FieldValue::Float(_) => ColumnKind::Float,
            FieldValue::Text(_) => ColumnKind::Text,
        }
    }
}

/// Value kind each column carries, aligned with [`COLUMNS`].
pub fn column_kind(column: &str) -> Option<ColumnKind> {
    match column {
        "type of meal" | "room type" | "market segment type" | "date of reservation" => {
            Some(ColumnKind::Text)
        }
        "average price " => Some(ColumnKind::Float),
        c if COLUMNS.contains(&c) => Some(ColumnKind::Integer),
        _ => None,
    }
}

impl BookingInquiry {
    /// Coerces raw form pairs, keyed by their HTML input names. When a name
    /// repeats, its first value is used.
    pub fn from_form(form: &[(String, String)]) -> Result<Self, InquiryError> {
        Ok(Self {
            number_of_adults: int_field(form, "number_of_adults")?,
            number_of_children: int_field(form, "number_of_children")?,
            number_of_weekend_nights: int_field(form, "number_of_weekend_nights")?,
            number_of_week_nights: int_field(form, "number_of_week_nights")?,
            type_of_meal: text_field(form, "type_of_meal")?,
            car_parking_space: int_field(form, "car_parking_space")?,
            room_type: text_field(form, "room_type")?,
            lead_time: int_field(form, "lead_time")?,
            market_segment_type: text_field(form, "market_segment_type")?,
            repeated: int_field(form, "repeated")?,
            p_c: int_field(form, "P_C")?,
            p_not_c: int_field(form, "P_not_C")?,
            average_price: float_field(form, "average_price")?,
            special_requests: int_field(form, "special_requests")?,
            date_of_reservation: text_field(form, "date_of_reservation")?,
        })
    }

    /// The record as `(column, value)` pairs in [`COLUMNS`] order.
    pub fn columns(&self) -> [(&'static str, FieldValue); 15] {
        [
            (COLUMNS[0], FieldValue::Int(self.number_of_adults)),
            (COLUMNS[1], FieldValue::Int(self.number_of_children)),
            (COLUMNS[2], FieldValue::Int(self.number_of_weekend_nights)),
            (COLUMNS[3], FieldValue::Int(self.number_of_week_nights)),
            (COLUMNS[4], FieldValue::Text(self.type_of_meal.clone())),
            (COLUMNS[5], FieldValue::Int(self.car_parking_space)),
            (COLUMNS[6], FieldValue::Text(self.room_type.clone())),
            (COLUMNS[7], FieldValue::Int(self.lead_time)),
            (COLUMNS[8], FieldValue::Text(self.market_segment_type.clone())),
            (COLUMNS[9], FieldValue::Int(self.repeated)),
            (COLUMNS[10], FieldValue::Int(self.p_c)),
            (COLUMNS[11], FieldValue::Int(self.p_not_c)),
            (COLUMNS[12], FieldValue::Float(self.average_price)),
            (COLUMNS[13], FieldValue::Int(self.special_requests)),
            (COLUMNS[14], FieldValue::Text(self.date_of_reservation.clone())),
        ]
    }
}

fn raw<'a>(form: &'a [(String, String)], field: &'static str) -> Result<&'a str, InquiryError> {
    form.iter()
        .find(|(name, _)| name == field)
        .map(|(_, value)| value.as_str())
        .ok_or(InquiryError::MissingField(field))
}

fn int_field(form: &[(String, String)], field: &'static str) -> Result<i64, InquiryError> {
    let value = raw(form, field)?;
    value
        .trim()
        .parse()
        .map_err(|_| InquiryError::InvalidInteger {
            field,
            value: value.to_string(),
        })
}

fn float_field(form: &[(String, String)], field: &'static str) -> Result<f64, InquiryError> {
    let value = raw(form, field)?;
    value
        .trim()
        .parse()
        .map_err(|_| InquiryError::InvalidFloat {
            field,
            value: value.to_string(),
        })
}

fn text_field(form: &[(String, String)], field: &'static str) -> Result<String, InquiryError> {
    raw(form, field).map(str::to_string)
}

/// Label exactly as the classifier emitted it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawLabel {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for RawLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawLabel::Int(v) => write!(f, "{v}"),
            // Debug keeps the fractional part, so 1.0 prints as "1.0" and is not read as class 1.
            RawLabel::Float(v) => write!(f, "{v:?}"),
            RawLabel::Text(v) => f.write_str(v),
        }
    }
}

/// Normalized prediction shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Canceled,
    NotCanceled,
    Unrecognized(String),
}

impl Verdict {
    pub fn from_raw(raw: &RawLabel) -> Self {
        let text = raw.to_string();
        match text.to_lowercase().as_str() {
            "0" | "canceled" | "cancelled" => Verdict::Canceled,
            "1" | "not_canceled" | "not cancelled" => Verdict::NotCanceled,
            _ => Verdict::Unrecognized(text),
        }
    }
}
