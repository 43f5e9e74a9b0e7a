//! FILENAME: core/report-engine/src/editor.rs
//! Report Configuration Model - the editable state behind the report builder.
//!
//! The editor owns a ReportConfig and keeps it consistent across edits:
//! report fields are stored in presentation order with `order` equal to
//! their position, filter ids are assigned here and never reused.

use engine::RecordRef;

use crate::catalog::FieldCatalog;
use crate::definition::{
    AggregationType, FieldId, Filter, FilterOperator, ReportConfig, ReportField, ReportLayout, SortKey,
};
use crate::engine::{run_report, ReportResult};
use crate::error::EditError;
use crate::validation::{self, PrunedReference, ValidationErrors, ValidationIssue};

const FILTER_ID_PREFIX: &str = "filter-";

#[derive(Debug, Clone, Default)]
pub struct ReportEditor {
    config: ReportConfig,
    next_filter_id: u64,
}

impl ReportEditor {
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_config(ReportConfig::new(name))
    }

    /// Wraps an existing (e.g. saved) configuration. Field orders are
    /// normalized and the filter counter continues past any `filter-N` id.
    pub fn from_config(mut config: ReportConfig) -> Self {
        config.fields.sort_by_key(|f| f.order);
        reindex(&mut config.fields);

        let next_filter_id = config
            .filters
            .iter()
            .filter_map(|f| f.id.strip_prefix(FILTER_ID_PREFIX)?.parse::<u64>().ok())
            .max()
            .map_or(1, |n| n + 1);

        ReportEditor { config, next_filter_id }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn into_config(self) -> ReportConfig {
        self.config
    }

    // ========================================================================
    // FIELDS
    // ========================================================================

    /// Appends a catalog field with the default aggregation for its type.
    pub fn add_field(&mut self, id: &str, catalog: &FieldCatalog) -> Result<&ReportField, EditError> {
        let field_type = catalog
            .field_type(id)
            .ok_or_else(|| EditError::UnknownField(id.to_string()))?;
        if self.config.field(id).is_some() {
            return Err(EditError::DuplicateField(id.to_string()));
        }

        let order = self.config.fields.len();
        self.config
            .fields
            .push(ReportField::new(id, AggregationType::default_for(field_type), order));
        Ok(&self.config.fields[order])
    }

    pub fn remove_field(&mut self, id: &str) -> Result<ReportField, EditError> {
        let position = self.position_of(id)?;
        let removed = self.config.fields.remove(position);
        reindex(&mut self.config.fields);
        Ok(removed)
    }

    /// Moves the field at position `from` to position `to`.
    pub fn move_field(&mut self, from: usize, to: usize) -> Result<(), EditError> {
        let len = self.config.fields.len();
        for index in [from, to] {
            if index >= len {
                return Err(EditError::IndexOutOfRange { index, len });
            }
        }
        let field = self.config.fields.remove(from);
        self.config.fields.insert(to, field);
        reindex(&mut self.config.fields);
        Ok(())
    }

    pub fn set_aggregation(&mut self, id: &str, aggregation: AggregationType) -> Result<(), EditError> {
        let position = self.position_of(id)?;
        self.config.fields[position].aggregation = aggregation;
        Ok(())
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> Result<(), EditError> {
        let position = self.position_of(id)?;
        self.config.fields[position].visible = visible;
        Ok(())
    }

    fn position_of(&self, id: &str) -> Result<usize, EditError> {
        self.config
            .fields
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| EditError::UnknownField(id.to_string()))
    }

    // ========================================================================
    // FILTERS
    // ========================================================================

    /// Adds a filter and returns its assigned id. Field and value may be
    /// empty while the user is still filling the filter in.
    pub fn add_filter(&mut self, field: impl Into<FieldId>, operator: FilterOperator, value: impl Into<String>) -> String {
        let id = format!("{}{}", FILTER_ID_PREFIX, self.next_filter_id);
        self.next_filter_id += 1;
        self.config.filters.push(Filter::new(id.clone(), field, operator, value));
        id
    }

    pub fn update_filter(
        &mut self,
        id: &str,
        field: impl Into<FieldId>,
        operator: FilterOperator,
        value: impl Into<String>,
    ) -> Result<(), EditError> {
        let filter = self
            .config
            .filters
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| EditError::UnknownFilter(id.to_string()))?;
        filter.field = field.into();
        filter.operator = operator;
        filter.value = value.into();
        Ok(())
    }

    pub fn remove_filter(&mut self, id: &str) -> Result<Filter, EditError> {
        let position = self
            .config
            .filters
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| EditError::UnknownFilter(id.to_string()))?;
        Ok(self.config.filters.remove(position))
    }

    // ========================================================================
    // GROUPING, SORTING, PRESENTATION
    // ========================================================================

    pub fn set_group_by(&mut self, group_by: Vec<FieldId>) {
        self.config.group_by = group_by;
    }

    pub fn set_sort_by(&mut self, sort_by: Vec<SortKey>) {
        self.config.sort_by = sort_by;
    }

    pub fn set_layout(&mut self, layout: ReportLayout) {
        self.config.layout = layout;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.config.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.config.description = description.into();
    }

    // ========================================================================
    // CHECKS & PIPELINE
    // ========================================================================

    pub fn validate(&self, catalog: &FieldCatalog) -> Vec<ValidationIssue> {
        validation::validate(&self.config, catalog)
    }

    /// Filter, aggregate and sort `records` with the current configuration.
    pub fn generate(&self, records: &[RecordRef], catalog: &FieldCatalog) -> Result<ReportResult, ValidationErrors> {
        run_report(records, &self.config, catalog)
    }

    /// Returns a snapshot of the configuration fit to be saved.
    pub fn save(&self, catalog: &FieldCatalog) -> Result<ReportConfig, ValidationErrors> {
        validation::validate_for_save(&self.config, catalog)?;
        Ok(self.config.clone())
    }

    /// Drops references to fields that disappeared from the catalog.
    pub fn reconcile(&mut self, catalog: &FieldCatalog) -> Vec<PrunedReference> {
        validation::prune_removed_fields(&mut self.config, catalog)
    }
}

fn reindex(fields: &mut [ReportField]) {
    for (idx, field) in fields.iter_mut().enumerate() {
        field.order = idx;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ConfigLocation;
    use engine::{Record, Value};
    use std::sync::Arc;

    fn records() -> Vec<RecordRef> {
        vec![
            Arc::new(Record::from_pairs([
                ("item", Value::text("Stapler")),
                ("department", Value::text("Ops")),
                ("quantity", Value::from(4.0)),
                ("urgent", Value::Bool(true)),
            ])),
            Arc::new(Record::from_pairs([
                ("item", Value::text("Paper")),
                ("department", Value::text("Finance")),
                ("quantity", Value::from(20.0)),
                ("urgent", Value::Bool(false)),
            ])),
        ]
    }

    fn orders(editor: &ReportEditor) -> Vec<(String, usize)> {
        editor.config().fields.iter().map(|f| (f.id.clone(), f.order)).collect()
    }

    #[test]
    fn test_add_field_defaults_by_type() {
        let catalog = FieldCatalog::from_records(&records());
        let mut editor = ReportEditor::new("r");
        assert_eq!(editor.add_field("quantity", &catalog).unwrap().aggregation, AggregationType::Sum);
        assert_eq!(editor.add_field("item", &catalog).unwrap().aggregation, AggregationType::Count);
        let urgent = editor.add_field("urgent", &catalog).unwrap();
        assert_eq!(urgent.aggregation, AggregationType::Count);
        assert_eq!(urgent.order, 2);
    }

    #[test]
    fn test_add_field_rejects_unknown_and_duplicate() {
        let catalog = FieldCatalog::from_records(&records());
        let mut editor = ReportEditor::new("r");
        assert_eq!(editor.add_field("vendor", &catalog).unwrap_err(), EditError::UnknownField("vendor".into()));
        editor.add_field("quantity", &catalog).unwrap();
        assert_eq!(editor.add_field("quantity", &catalog).unwrap_err(), EditError::DuplicateField("quantity".into()));
        assert_eq!(editor.config().fields.len(), 1);
    }

    #[test]
    fn test_remove_and_move_keep_orders_contiguous() {
        let catalog = FieldCatalog::from_records(&records());
        let mut editor = ReportEditor::new("r");
        for id in ["item", "department", "quantity", "urgent"] {
            editor.add_field(id, &catalog).unwrap();
        }

        editor.remove_field("department").unwrap();
        assert_eq!(orders(&editor), vec![("item".into(), 0), ("quantity".into(), 1), ("urgent".into(), 2)]);

        editor.move_field(2, 0).unwrap();
        assert_eq!(orders(&editor), vec![("urgent".into(), 0), ("item".into(), 1), ("quantity".into(), 2)]);

        assert_eq!(editor.move_field(0, 3).unwrap_err(), EditError::IndexOutOfRange { index: 3, len: 3 });
        assert_eq!(editor.remove_field("department").unwrap_err(), EditError::UnknownField("department".into()));
    }

    #[test]
    fn test_filter_ids_are_assigned_and_not_reused() {
        let mut editor = ReportEditor::new("r");
        let first = editor.add_filter("quantity", FilterOperator::Greater, "10");
        let second = editor.add_filter("", FilterOperator::Equals, "");
        assert_eq!(first, "filter-1");
        assert_eq!(second, "filter-2");

        editor.remove_filter(&first).unwrap();
        assert_eq!(editor.add_filter("item", FilterOperator::Contains, "pa"), "filter-3");

        editor.update_filter(&second, "department", FilterOperator::Equals, "Ops").unwrap();
        assert!(editor.config().filters.iter().any(|f| f.id == second && f.value == "Ops"));
        assert_eq!(editor.remove_filter("filter-99").unwrap_err(), EditError::UnknownFilter("filter-99".into()));
    }

    #[test]
    fn test_from_config_continues_filter_counter() {
        let mut config = ReportConfig::new("saved");
        config.filters.push(Filter::new("filter-7", "item", FilterOperator::Equals, "Paper"));
        config.fields.push(ReportField::new("quantity", AggregationType::Sum, 5));
        let mut editor = ReportEditor::from_config(config);
        assert_eq!(editor.add_filter("item", FilterOperator::Equals, "Pen"), "filter-8");
        assert_eq!(editor.config().fields[0].order, 0);
    }

    #[test]
    fn test_generate_and_save() {
        let records = records();
        let catalog = FieldCatalog::from_records(&records);
        let mut editor = ReportEditor::new("");

        let err = editor.save(&catalog).unwrap_err();
        assert!(err.has(&ConfigLocation::Name));
        assert!(err.has(&ConfigLocation::Fields));
        assert!(editor.generate(&records, &catalog).is_err());

        editor.set_name("Supplies");
        editor.set_description("Quantities per department");
        editor.add_field("quantity", &catalog).unwrap();
        editor.set_group_by(vec!["department".to_string()]);
        editor.set_sort_by(vec![SortKey::desc("quantity")]);
        editor.set_layout(ReportLayout::Bar);

        let result = editor.generate(&records, &catalog).unwrap();
        assert_eq!(result.rows[0].label(), "Finance");
        let saved = editor.save(&catalog).unwrap();
        assert_eq!(&saved, editor.config());
        assert!(editor.validate(&catalog).is_empty());
    }

    #[test]
    fn test_hidden_field_and_aggregation_change() {
        let records = records();
        let catalog = FieldCatalog::from_records(&records);
        let mut editor = ReportEditor::new("r");
        editor.add_field("quantity", &catalog).unwrap();
        editor.add_field("item", &catalog).unwrap();
        editor.set_aggregation("quantity", AggregationType::Max).unwrap();
        editor.set_visible("item", false).unwrap();

        let result = editor.generate(&records, &catalog).unwrap();
        assert_eq!(result.rows[0].metrics.len(), 1);
        assert_eq!(result.rows[0].metric("quantity"), Some(20.0));
        assert!(editor.set_visible("vendor", true).is_err());
    }
}
