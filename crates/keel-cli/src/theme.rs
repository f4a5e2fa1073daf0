use console::style;
use dialoguer::theme::ColorfulTheme;

/// Returns the theme used for confirmation prompts
pub fn confirm_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_style: console::Style::new().yellow().bold(),
        prompt_prefix: style(" ".to_string()),
        success_prefix: style(" ".to_string()),
        error_prefix: style("✖".to_string()).red().bold(),
        hint_style: console::Style::new().dim(),
        values_style: console::Style::new().cyan(),
        ..Default::default()
    }
}
