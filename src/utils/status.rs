use crate::config::{Config, GridSource};
use comfy_table::{Attribute, Cell, CellAlignment, Table};

pub fn config_table(config: &Config) -> Table {
    let grid = match &config.grid {
        GridSource::Url(url) => url.clone(),
        GridSource::Local(path) => path.display().to_string(),
    };

    let mut table = Table::new();
    table
        .set_header(vec![
            Cell::new("Setting")
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Center),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ])
        .load_preset(comfy_table::presets::ASCII_BORDERS_ONLY_CONDENSED);

    let rows = [
        ("Grid", grid),
        ("STAC search", config.stac_url.clone()),
        ("Collection", config.collection.clone()),
        ("Page size", config.page_size.to_string()),
        ("Max cloud cover", format!("{}%", config.max_cloud_cover)),
        (
            "Request timeout",
            format!("{}s", config.request_timeout.as_secs()),
        ),
        ("Preferences", config.preferences_path.display().to_string()),
    ];
    for (name, value) in rows {
        table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }
    table
}

pub fn print_config_summary(config: &Config) {
    println!("\nConfiguration:\n{}", config_table(config));

    if let GridSource::Local(path) = &config.grid {
        if !path.exists() {
            println!("\nWarnings:");
            println!(
                "  ⚠️ Grid file {} does not exist, cells cannot be selected",
                path.display()
            );
        }
    }
    println!();
}
