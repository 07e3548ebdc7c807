use crate::book::ValueType;

/// SQL column types emitted for book fields.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColumnType {
    /// Variable-length strings
    Text,
    /// Floating point numbers
    Float,
    /// Boolean values (true/false)
    Boolean,
}

/// Outcome of scanning every record value of a generic field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Observation {
    /// First subtype observed, kept as a best effort even when later records disagree
    pub actual: Option<ValueType>,
    /// True when at least two records reported different subtypes
    pub conflicting: bool,
}

/// A column of a base table, bound to the field it was derived from.
#[derive(Clone, Debug)]
pub struct Column {
    /// Key of the source field
    pub key: String,
    /// Column name
    pub name: String,
    /// Column data type
    pub kind: ColumnType,
    /// Observed value subtype, for generic fields
    pub observation: Observation,
}

impl ColumnType {
    /// Returns the type name used in `CREATE TABLE`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
        }
    }

    /// Maps an actual value subtype to its column type.
    /// Dates are stored as ISO text; unknown subtypes fall back to text.
    pub fn from(value_type: &ValueType) -> Self {
        match value_type {
            ValueType::Numeric | ValueType::Currency | ValueType::Percent => ColumnType::Float,
            ValueType::Boolean => ColumnType::Boolean,
            ValueType::String
            | ValueType::Image
            | ValueType::DayOfYear
            | ValueType::File
            | ValueType::Email
            | ValueType::Date
            | ValueType::Other(_) => ColumnType::Text,
        }
    }
}

impl Observation {
    /// Reduces the subtypes reported by records, in record order.
    pub fn detect<I>(types: I) -> Self
    where
        I: IntoIterator<Item = ValueType>,
    {
        let mut observation = Observation::default();
        for kind in types {
            match observation.actual {
                None => observation.actual = Some(kind),
                Some(ref actual) if *actual != kind => observation.conflicting = true,
                Some(_) => (),
            }
        }
        observation
    }

    /// Column type for this observation: the subtype's mapping when every record
    /// agreed, text otherwise.
    pub fn column_type(&self) -> ColumnType {
        match &self.actual {
            Some(actual) if !self.conflicting => ColumnType::from(actual),
            _ => ColumnType::Text,
        }
    }

    /// True when every observed value was a date.
    pub fn is_date(&self) -> bool {
        !self.conflicting && self.actual == Some(ValueType::Date)
    }
}

impl Column {
    pub fn new(key: &str, name: &str, kind: ColumnType) -> Self {
        Self {
            key: key.to_owned(),
            name: name.to_owned(),
            kind,
            observation: Observation::default(),
        }
    }

    /// Whether values of this column are rewritten from `MM/DD/YYYY` to ISO form.
    #[inline]
    pub fn normalizes_dates(&self) -> bool {
        self.observation.is_date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_value_types() {
        assert_eq!(ColumnType::from(&ValueType::String), ColumnType::Text);
        assert_eq!(ColumnType::from(&ValueType::Image), ColumnType::Text);
        assert_eq!(ColumnType::from(&ValueType::DayOfYear), ColumnType::Text);
        assert_eq!(ColumnType::from(&ValueType::File), ColumnType::Text);
        assert_eq!(ColumnType::from(&ValueType::Email), ColumnType::Text);
        assert_eq!(ColumnType::from(&ValueType::Numeric), ColumnType::Float);
        assert_eq!(ColumnType::from(&ValueType::Currency), ColumnType::Float);
        assert_eq!(ColumnType::from(&ValueType::Percent), ColumnType::Float);
        assert_eq!(ColumnType::from(&ValueType::Boolean), ColumnType::Boolean);
        assert_eq!(ColumnType::from(&ValueType::Date), ColumnType::Text);
        assert_eq!(ColumnType::from(&ValueType::Other("x".to_owned())), ColumnType::Text);
        assert_eq!(ColumnType::Float.as_str(), "float");
    }

    #[test]
    fn detect_agreeing_types() {
        let observation = Observation::detect(vec![ValueType::Numeric, ValueType::Numeric]);
        assert_eq!(observation.actual, Some(ValueType::Numeric));
        assert!(!observation.conflicting);
        assert_eq!(observation.column_type(), ColumnType::Float);
    }

    #[test]
    fn detect_conflicting_types() {
        let observation = Observation::detect(vec![
            ValueType::Numeric,
            ValueType::String,
            ValueType::Numeric,
        ]);
        assert_eq!(observation.actual, Some(ValueType::Numeric));
        assert!(observation.conflicting);
        assert_eq!(observation.column_type(), ColumnType::Text);
    }

    #[test]
    fn detect_nothing() {
        let observation = Observation::detect(Vec::new());
        assert_eq!(observation.actual, None);
        assert_eq!(observation.column_type(), ColumnType::Text);
        assert!(!observation.is_date());
    }

    #[test]
    fn dates_only_when_consistent() {
        assert!(Observation::detect(vec![ValueType::Date, ValueType::Date]).is_date());
        assert!(!Observation::detect(vec![ValueType::Date, ValueType::String]).is_date());
    }
}
