//! Field predicates for store queries.
//!
//! A [`Filter`] is a conjunction of clauses over top-level fields of a
//! record's JSON body. It compiles to a SQL `WHERE` fragment using
//! `json_extract` with bound values.

use super::StoreError;

/// A value compared against a record field.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Bool(bool),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<&String> for FilterValue {
    fn from(value: &String) -> Self {
        FilterValue::Text(value.clone())
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Integer(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Clause {
    Eq(&'static str, FilterValue),
    Contains(&'static str, String),
    AnyContains(Vec<&'static str>, String),
}

/// Conjunction of field clauses. An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    /// Field equals value.
    pub fn eq(mut self, field: &'static str, value: impl Into<FilterValue>) -> Self {
        self.clauses.push(Clause::Eq(field, value.into()));
        self
    }

    /// Field contains `needle`, ignoring case.
    pub fn contains(mut self, field: &'static str, needle: impl Into<String>) -> Self {
        self.clauses.push(Clause::Contains(field, needle.into()));
        self
    }

    /// At least one of `fields` contains `needle`, ignoring case.
    pub fn any_contains(mut self, fields: &[&'static str], needle: impl Into<String>) -> Self {
        self.clauses
            .push(Clause::AnyContains(fields.to_vec(), needle.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Renders the `WHERE` fragment (without the keyword) and the values to
    /// bind, in order. An empty filter renders as `1`.
    pub(crate) fn to_sql(&self) -> Result<(String, Vec<FilterValue>), StoreError> {
        if self.clauses.is_empty() {
            return Ok(("1".to_string(), Vec::new()));
        }

        let mut parts = Vec::with_capacity(self.clauses.len());
        let mut binds = Vec::new();

        for clause in &self.clauses {
            match clause {
                Clause::Eq(field, value) => {
                    parts.push(format!("{} = ?", extract(field)?));
                    binds.push(value.clone());
                }
                Clause::Contains(field, needle) => {
                    parts.push(contains_sql(field)?);
                    binds.push(FilterValue::Text(needle.clone()));
                }
                Clause::AnyContains(fields, needle) => {
                    if fields.is_empty() {
                        parts.push("0".to_string());
                        continue;
                    }
                    let mut any = Vec::with_capacity(fields.len());
                    for field in fields {
                        any.push(contains_sql(field)?);
                        binds.push(FilterValue::Text(needle.clone()));
                    }
                    parts.push(format!("({})", any.join(" OR ")));
                }
            }
        }

        Ok((parts.join(" AND "), binds))
    }
}

/// Field names are spliced into SQL, so only plain identifiers are allowed.
fn is_identifier(field: &str) -> bool {
    let mut chars = field.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn extract(field: &'static str) -> Result<String, StoreError> {
    if !is_identifier(field) {
        return Err(StoreError::InvalidField(field));
    }
    Ok(format!("json_extract(body, '$.{}')", field))
}

fn contains_sql(field: &'static str) -> Result<String, StoreError> {
    Ok(format!("instr(lower({}), lower(?)) > 0", extract(field)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_matches_all() {
        let (sql, binds) = Filter::all().to_sql().unwrap();
        assert_eq!(sql, "1");
        assert!(binds.is_empty());
    }

    #[test]
    fn test_eq_and_contains() {
        let filter = Filter::all()
            .eq("business_id", "b1")
            .contains("name", "shirt");
        let (sql, binds) = filter.to_sql().unwrap();
        assert_eq!(
            sql,
            "json_extract(body, '$.business_id') = ? AND instr(lower(json_extract(body, '$.name')), lower(?)) > 0"
        );
        assert_eq!(
            binds,
            vec![
                FilterValue::Text("b1".to_string()),
                FilterValue::Text("shirt".to_string())
            ]
        );
    }

    #[test]
    fn test_any_contains_binds_needle_per_field() {
        let filter = Filter::all().any_contains(&["first_name", "last_name"], "ada");
        let (sql, binds) = filter.to_sql().unwrap();
        assert!(sql.starts_with('('));
        assert!(sql.contains(" OR "));
        assert_eq!(binds.len(), 2);
    }

    #[test]
    fn test_rejects_non_identifier_fields() {
        let filter = Filter::all().eq("name') OR 1=1 --", "x");
        assert!(matches!(
            filter.to_sql(),
            Err(StoreError::InvalidField(_))
        ));
        assert!(!is_identifier("Name"));
        assert!(!is_identifier("1name"));
        assert!(is_identifier("zip_code"));
    }
}
