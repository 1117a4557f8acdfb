use super::Mapper;
use crate::core::{ColumnDescriptor, Result, Value};
use crate::result::RowSource;
use crate::utils::LowerKeyMap;

/// Maps a row to its column values keyed by lower-cased label, without
/// coercion.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapMapper;

impl MapMapper {
    pub fn instance() -> &'static MapMapper {
        static INSTANCE: MapMapper = MapMapper;
        &INSTANCE
    }
}

impl Mapper<LowerKeyMap<Value>> for MapMapper {
    fn map(&self, row: &dyn RowSource, columns: &ColumnDescriptor) -> Result<LowerKeyMap<Value>> {
        let mut out = LowerKeyMap::with_capacity(columns.column_count());
        for column in columns {
            out.insert(&column.label, row.get_value(column.ordinal)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::QueryResult;

    #[test]
    fn test_keys_are_case_insensitive() {
        let result = QueryResult::from_labels(
            ["ID", "Name"],
            vec![vec![Value::Integer(1), Value::Text("a".into())]],
        );
        let rows = MapMapper::instance().map_result(&result).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("id"), Some(&Value::Integer(1)));
        assert_eq!(rows[0].get("NAME"), Some(&Value::Text("a".into())));
    }

    #[test]
    fn test_serializes_to_json() {
        let result = QueryResult::from_labels(["Count"], vec![vec![Value::Integer(3)]]);
        let mut cursor = result.cursor();
        let row = MapMapper.map_one(&mut cursor).unwrap().unwrap();

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json, serde_json::json!({ "count": { "Integer": 3 } }));
    }
}
