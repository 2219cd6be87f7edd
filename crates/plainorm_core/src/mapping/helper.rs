//! Row ↔ instance conversion.

use super::accessor;
use super::metadata::EntityMetadata;
use super::params::ParamMap;
use crate::error::{AccessError, MappingError};
use crate::model::schema::Entity;

/// Builds a new `E` from one result row.
///
/// Every mapped column (identifier included) must be present in `row`;
/// extra columns are ignored.
pub fn row_to_instance<E: Entity>(
    row: &ParamMap,
    metadata: &EntityMetadata,
) -> Result<E, MappingError> {
    let mut instance = E::default();
    for field in metadata.mapped_fields() {
        let value = row
            .get(field.column)
            .cloned()
            .ok_or(MappingError::MissingColumn {
                table: metadata.table,
                column: field.column,
            })?;
        accessor::set(field, &mut instance, value)?;
    }
    Ok(instance)
}

/// Maps every row in order; no rows yields an empty vector.
pub fn rows_to_instances<E: Entity>(
    metadata: &EntityMetadata,
    rows: &[ParamMap],
) -> Result<Vec<E>, MappingError> {
    rows.iter()
        .map(|row| row_to_instance(row, metadata))
        .collect()
}

/// Collects the persistable fields of `instance`, keyed by column name.
pub fn instance_to_param_map<E: Entity>(
    instance: &E,
    metadata: &EntityMetadata,
) -> Result<ParamMap, AccessError> {
    let mut params = ParamMap::with_capacity(metadata.persistable.len());
    for field in &metadata.persistable {
        params.insert(field.column, accessor::get(field, instance)?);
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::{instance_to_param_map, row_to_instance, rows_to_instances};
    use crate::error::MappingError;
    use crate::mapping::metadata::EntityMetadata;
    use crate::mapping::params::ParamMap;
    use crate::{FieldValue, Value};

    crate::entity! {
        #[table = "widgets"]
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Widget {
            #[id]
            id: Option<i64>,
            name: String,
            #[column = "unit_price"]
            price: i64,
            #[transient]
            note: Option<String>,
        }
    }

    fn metadata() -> EntityMetadata {
        EntityMetadata::of::<Widget>().unwrap()
    }

    #[test]
    fn param_map_excludes_identifier_and_transient_fields() {
        let widget = Widget {
            id: Some(4),
            name: "bolt".to_string(),
            price: 5,
            note: Some("scratch".to_string()),
        };
        let params = instance_to_param_map(&widget, &metadata()).unwrap();

        let entries: Vec<_> = params.iter().collect();
        assert_eq!(
            entries,
            vec![
                ("name", &Value::Text("bolt".to_string())),
                ("unit_price", &Value::Integer(5)),
            ]
        );
    }

    #[test]
    fn param_map_plus_identifier_round_trips() {
        let metadata = metadata();
        let widget = Widget {
            id: Some(12),
            name: "washer".to_string(),
            price: 1,
            note: None,
        };

        let mut row = instance_to_param_map(&widget, &metadata).unwrap();
        row.insert("id", widget.id.to_value());
        let restored: Widget = row_to_instance(&row, &metadata).unwrap();
        assert_eq!(restored, widget);
    }

    #[test]
    fn missing_column_is_a_mapping_error() {
        let row: ParamMap = [("id", Value::Integer(1)), ("name", Value::Text("x".into()))]
            .into_iter()
            .collect();
        let err = row_to_instance::<Widget>(&row, &metadata()).unwrap_err();
        assert_eq!(
            err,
            MappingError::MissingColumn {
                table: "widgets",
                column: "unit_price"
            }
        );
    }

    #[test]
    fn conversion_failure_is_a_mapping_error() {
        let row: ParamMap = [
            ("id", Value::Integer(1)),
            ("name", Value::Integer(7)),
            ("unit_price", Value::Integer(2)),
        ]
        .into_iter()
        .collect();
        let err = row_to_instance::<Widget>(&row, &metadata()).unwrap_err();
        assert!(matches!(err, MappingError::Access(_)));
    }

    #[test]
    fn empty_rows_map_to_empty_vec() {
        let widgets: Vec<Widget> = rows_to_instances(&metadata(), &[]).unwrap();
        assert!(widgets.is_empty());
    }
}
