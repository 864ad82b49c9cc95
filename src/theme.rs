use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub title_font_size: f32,
    pub label_font_size: f32,
    pub text_color: String,
    pub point_color: String,
    pub point_opacity: f32,
    pub average_x_color: String,
    pub average_y_color: String,
    pub leader_color: String,
    pub leader_width: f32,
    pub grid_color: String,
    pub axis_color: String,
    pub legend_background: String,
    pub legend_border: String,
    pub background: String,
}

impl Theme {
    /// Colors and sizes of a default matplotlib figure: C0 points, red and
    /// green average lines, 7.5pt labels at 100 dpi.
    pub fn classic() -> Self {
        Self {
            font_family: "\"DejaVu Sans\", Verdana, Arial, sans-serif".to_string(),
            font_size: 13.0,
            title_font_size: 16.0,
            label_font_size: 10.4,
            text_color: "#000000".to_string(),
            point_color: "#1F77B4".to_string(),
            point_opacity: 0.5,
            average_x_color: "#FF0000".to_string(),
            average_y_color: "#008000".to_string(),
            leader_color: "#000000".to_string(),
            leader_width: 0.5,
            grid_color: "#B0B0B0".to_string(),
            axis_color: "#000000".to_string(),
            legend_background: "#FFFFFF".to_string(),
            legend_border: "#CCCCCC".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            title_font_size: 17.0,
            label_font_size: 10.0,
            text_color: "#1C2430".to_string(),
            point_color: "#4E79A7".to_string(),
            point_opacity: 0.55,
            average_x_color: "#E15759".to_string(),
            average_y_color: "#59A14F".to_string(),
            leader_color: "#7A8AA6".to_string(),
            leader_width: 0.6,
            grid_color: "#E3E8F0".to_string(),
            axis_color: "#7A8AA6".to_string(),
            legend_background: "#FFFFFF".to_string(),
            legend_border: "#D7E0F0".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "modern" => Some(Self::modern()),
            "classic" | "default" | "matplotlib" => Some(Self::classic()),
            _ => None,
        }
    }
}
