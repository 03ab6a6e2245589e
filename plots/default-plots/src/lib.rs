use common::plot::Plot;
use grouped_bar::GroupedBar;
use times_table::TimesTable;

/// Links every plot crate so its `typetag` registration is visible to the config loader
pub fn init_plots() {
    _ = serde_json::to_string(&GroupedBar::default());
    _ = serde_json::to_string(&TimesTable::default());
}

/// Plots used when the config does not list any
pub fn default_plots() -> Vec<Box<dyn Plot>> {
    vec![Box::new(GroupedBar::default())]
}
