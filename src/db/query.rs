//! Parameterized query description.

/// A bound query parameter. Client values only ever reach SQL through these.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Float(f64),
    Int(i64),
    Int4(i32),
    Text(Option<String>),
    IntArray(Vec<i64>),
    TextArray(Vec<String>),
}

/// SQL text with `$n` placeholders plus the values bound to them.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialQuery {
    pub sql: String,
    pub params: Vec<Param>,
    /// Result column the rows must be ordered by, ascending
    pub order_by: Option<&'static str>,
}

impl SpatialQuery {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            order_by: None,
        }
    }

    pub fn bind(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn ordered_by(mut self, column: &'static str) -> Self {
        self.order_by = Some(column);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_bind_order() {
        let query = SpatialQuery::new("SELECT $1, $2")
            .bind(Param::Float(30.3))
            .bind(Param::Int(5))
            .ordered_by("dist_m");

        assert_eq!(query.params, vec![Param::Float(30.3), Param::Int(5)]);
        assert_eq!(query.order_by, Some("dist_m"));
    }
}
