//! Request types.

use serde::{Deserialize, Serialize};

use super::grid::{Grid, GridError};

/// A DNA analysis request as it arrives from a transport.
///
/// `dna` and each of its rows may be `null` in JSON; validation happens in
/// [`DnaRequest::grid`], not at deserialization, so a bad request still
/// produces a reasoned rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DnaRequest {
    /// Request ID, for log correlation.
    #[serde(default = "new_request_id")]
    pub request_id: String,

    /// Grid rows.
    #[serde(default)]
    pub dna: Option<Vec<Option<String>>>,
}

fn new_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl DnaRequest {
    /// Creates a request from rows.
    pub fn new<S: Into<String>>(rows: impl IntoIterator<Item = S>) -> Self {
        Self {
            request_id: new_request_id(),
            dna: Some(rows.into_iter().map(|r| Some(r.into())).collect()),
        }
    }

    /// Validates the rows into a grid.
    pub fn grid(&self) -> Result<Grid, GridError> {
        Grid::from_nullable(self.dna.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_request() {
        let request = DnaRequest::new(["AT", "CG"]);
        assert!(!request.request_id.is_empty());
        assert_eq!(request.grid().unwrap().size(), 2);
    }

    #[test]
    fn test_deserialize_with_nulls() {
        let request: DnaRequest = serde_json::from_str(r#"{"dna": ["AT", null]}"#).unwrap();
        assert_eq!(request.grid(), Err(GridError::NullRow { row: 1 }));

        let request: DnaRequest = serde_json::from_str(r#"{"dna": null}"#).unwrap();
        assert_eq!(request.grid(), Err(GridError::NullGrid));

        let request: DnaRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.grid(), Err(GridError::NullGrid));
        assert!(!request.request_id.is_empty());
    }
}
