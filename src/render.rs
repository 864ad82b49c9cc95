use crate::plot::{LegendKind, ScatterFigure};
use crate::quadrant::HorizontalAlign;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const TICK_LENGTH: f32 = 5.0;

pub fn render_svg(figure: &ScatterFigure, theme: &Theme) -> String {
    let mut svg = String::new();
    let width = figure.frame.canvas_width;
    let height = figure.frame.canvas_height;
    let (ax, ay, aw, ah) = figure.frame.area;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    svg.push_str("<g class=\"grid\">");
    for tick in &figure.x_ticks {
        svg.push_str(&format!(
            "<line x1=\"{x:.2}\" y1=\"{ay:.2}\" x2=\"{x:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"0.8\" stroke-opacity=\"0.6\"/>",
            ay + ah,
            theme.grid_color,
            x = tick.position,
        ));
    }
    for tick in &figure.y_ticks {
        svg.push_str(&format!(
            "<line x1=\"{ax:.2}\" y1=\"{y:.2}\" x2=\"{:.2}\" y2=\"{y:.2}\" stroke=\"{}\" stroke-width=\"0.8\" stroke-opacity=\"0.6\"/>",
            ax + aw,
            theme.grid_color,
            y = tick.position,
        ));
    }
    svg.push_str("</g>");

    svg.push_str(&axes_svg(figure, theme));

    svg.push_str("<g class=\"points\">");
    for &(x, y) in &figure.points {
        svg.push_str(&format!(
            "<circle cx=\"{x:.2}\" cy=\"{y:.2}\" r=\"{:.2}\" fill=\"{}\" fill-opacity=\"{}\"/>",
            figure.point_radius, theme.point_color, theme.point_opacity
        ));
    }
    svg.push_str("</g>");

    svg.push_str(&format!(
        "<line class=\"average-x\" x1=\"{x:.2}\" y1=\"{ay:.2}\" x2=\"{x:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"1.5\" stroke-dasharray=\"6 4\"/>",
        ay + ah,
        theme.average_x_color,
        x = figure.average_x,
    ));
    svg.push_str(&format!(
        "<line class=\"average-y\" x1=\"{ax:.2}\" y1=\"{y:.2}\" x2=\"{:.2}\" y2=\"{y:.2}\" stroke=\"{}\" stroke-width=\"1.5\" stroke-dasharray=\"6 4\"/>",
        ax + aw,
        theme.average_y_color,
        y = figure.average_y,
    ));

    svg.push_str("<g class=\"labels\">");
    for placed in &figure.labels.labels {
        if let Some(leader) = &placed.leader {
            svg.push_str(&format!(
                "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{}\"/>",
                leader.from.0, leader.from.1, leader.to.0, leader.to.1, theme.leader_color, theme.leader_width
            ));
        }
        let label = &placed.label;
        // The box already sits on the anchored side; only the text anchor
        // follows the alignment so glyph overhang grows away from the point.
        let (x, anchor) = match label.anchoring.horizontal {
            HorizontalAlign::Left => (label.center.0 - label.half_width, "start"),
            HorizontalAlign::Right => (label.center.0 + label.half_width, "end"),
        };
        svg.push_str(&format!(
            "<text x=\"{x:.2}\" y=\"{:.2}\" text-anchor=\"{anchor}\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            label.center.1,
            escape_xml(&theme.font_family),
            theme.label_font_size,
            theme.text_color,
            escape_xml(&label.text)
        ));
    }
    svg.push_str("</g>");

    svg.push_str(&legend_svg(figure, theme));

    svg.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"bold\" fill=\"{}\">{}</text>",
        ax + aw / 2.0,
        (ay * 0.5 + theme.title_font_size * 0.35).max(theme.title_font_size),
        escape_xml(&theme.font_family),
        theme.title_font_size,
        theme.text_color,
        escape_xml(&figure.title)
    ));

    svg.push_str("</svg>");
    svg
}

fn axes_svg(figure: &ScatterFigure, theme: &Theme) -> String {
    let (ax, ay, aw, ah) = figure.frame.area;
    let bottom = ay + ah;
    let mut out = String::new();
    out.push_str(&format!(
        "<rect x=\"{ax:.2}\" y=\"{ay:.2}\" width=\"{aw:.2}\" height=\"{ah:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1\"/>",
        theme.axis_color
    ));

    for tick in &figure.x_ticks {
        out.push_str(&format!(
            "<line x1=\"{x:.2}\" y1=\"{bottom:.2}\" x2=\"{x:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"1\"/>",
            bottom + TICK_LENGTH,
            theme.axis_color,
            x = tick.position,
        ));
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            tick.position,
            bottom + TICK_LENGTH + theme.font_size,
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.text_color,
            escape_xml(&tick.label)
        ));
    }
    for tick in &figure.y_ticks {
        out.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{y:.2}\" x2=\"{ax:.2}\" y2=\"{y:.2}\" stroke=\"{}\" stroke-width=\"1\"/>",
            ax - TICK_LENGTH,
            theme.axis_color,
            y = tick.position,
        ));
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"end\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            ax - TICK_LENGTH - 3.0,
            tick.position,
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.text_color,
            escape_xml(&tick.label)
        ));
    }

    let x_label_y = bottom + TICK_LENGTH + theme.font_size * 3.0;
    out.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{x_label_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        ax + aw / 2.0,
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.text_color,
        escape_xml(&figure.x_label)
    ));
    let y_label_x = (ax - theme.font_size * 5.0).max(theme.font_size);
    let y_label_y = ay + ah / 2.0;
    out.push_str(&format!(
        "<text x=\"{y_label_x:.2}\" y=\"{y_label_y:.2}\" text-anchor=\"middle\" transform=\"rotate(-90 {y_label_x:.2} {y_label_y:.2})\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.text_color,
        escape_xml(&figure.y_label)
    ));
    out
}

fn legend_svg(figure: &ScatterFigure, theme: &Theme) -> String {
    let legend = &figure.legend;
    let (x, y, w, h) = legend.rect;
    let mut out = String::new();
    out.push_str(&format!(
        "<g class=\"legend\"><rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{w:.2}\" height=\"{h:.2}\" rx=\"4\" ry=\"4\" fill=\"{}\" fill-opacity=\"0.8\" stroke=\"{}\" stroke-width=\"1\"/>",
        theme.legend_background, theme.legend_border
    ));

    let swatch_x = x + 8.0;
    let text_x = swatch_x + 36.0;
    for (idx, entry) in legend.entries.iter().enumerate() {
        let row_y = y + 8.0 + legend.row_height * (idx as f32 + 0.5);
        match entry.kind {
            LegendKind::Population => out.push_str(&format!(
                "<circle cx=\"{:.2}\" cy=\"{row_y:.2}\" r=\"{:.2}\" fill=\"{}\" fill-opacity=\"{}\"/>",
                swatch_x + 14.0,
                figure.point_radius,
                theme.point_color,
                theme.point_opacity
            )),
            LegendKind::AverageX | LegendKind::AverageY => {
                let color = if entry.kind == LegendKind::AverageX {
                    &theme.average_x_color
                } else {
                    &theme.average_y_color
                };
                out.push_str(&format!(
                    "<line x1=\"{swatch_x:.2}\" y1=\"{row_y:.2}\" x2=\"{:.2}\" y2=\"{row_y:.2}\" stroke=\"{color}\" stroke-width=\"1.5\" stroke-dasharray=\"6 4\"/>",
                    swatch_x + 28.0
                ));
            }
        }
        out.push_str(&format!(
            "<text x=\"{text_x:.2}\" y=\"{row_y:.2}\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.text_color,
            escape_xml(&entry.text)
        ));
    }
    out.push_str("</g>");
    out
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(
    svg: &str,
    output: &Path,
    render_cfg: &crate::config::RenderConfig,
) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "DejaVu Sans".to_string();
    opt.fontdb_mut().load_system_fonts();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;
    pixmap.fill(parse_background(&render_cfg.background));

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(feature = "png")]
fn parse_background(hex: &str) -> resvg::tiny_skia::Color {
    let digits = hex.trim_start_matches('#');
    if digits.len() == 6
        && let Ok(rgb) = u32::from_str_radix(digits, 16)
    {
        return resvg::tiny_skia::Color::from_rgba8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 255);
    }
    resvg::tiny_skia::Color::WHITE
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::plot::compute_scatter;
    use crate::stats::RawTable;

    fn figure() -> ScatterFigure {
        let mut raw = RawTable::new(vec!["K%".into(), "BB%".into(), "PA".into()]);
        raw.push("José Ramírez", "CLE", vec![Some(0.11), Some(0.09), Some(650.0)]);
        raw.push("O'Neil Cruz", "PIT", vec![Some(0.30), Some(0.12), Some(600.0)]);
        raw.push("Luis Arraez", "SDP", vec![Some(0.04), Some(0.04), Some(620.0)]);
        let mut config = Config::default();
        config.selection.metric_x = "K%".into();
        config.selection.metric_y = "BB%".into();
        config.plot.fast_text_metrics = true;
        compute_scatter(&raw, &config).expect("figure")
    }

    #[test]
    fn render_svg_basic() {
        let figure = figure();
        let svg = render_svg(&figure, &Theme::classic());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<circle").count(), figure.points.len() + 1);
        assert!(svg.contains("stroke-dasharray=\"6 4\""));
        assert!(svg.contains("K% vs BB% in 2025"));
        assert!(svg.contains("font-weight=\"bold\""));
    }

    #[test]
    fn label_text_is_escaped() {
        let svg = render_svg(&figure(), &Theme::classic());
        assert!(svg.contains("O&apos;Neil Cruz"));
        assert!(svg.contains("José Ramírez"));
    }

    #[test]
    fn average_lines_use_theme_colors() {
        let theme = Theme::classic();
        let svg = render_svg(&figure(), &theme);
        assert!(svg.contains(&format!("stroke=\"{}\"", theme.average_x_color)));
        assert!(svg.contains(&format!("stroke=\"{}\"", theme.average_y_color)));
    }

    #[test]
    fn quoted_font_family_is_escaped() {
        let svg = render_svg(&figure(), &Theme::classic());
        assert!(svg.contains("font-family=\"&quot;DejaVu Sans&quot;, Verdana, Arial, sans-serif\""));
        assert!(!svg.contains("font-family=\"\""));
    }

    #[cfg(feature = "png")]
    #[test]
    fn classic_theme_svg_parses() {
        let svg = render_svg(&figure(), &Theme::classic());
        let tree = usvg::Tree::from_str(&svg, &usvg::Options::default());
        assert!(tree.is_ok(), "{:?}", tree.err());
    }

    #[test]
    fn escape_xml_handles_markup() {
        assert_eq!(escape_xml("<a & b>"), "&lt;a &amp; b&gt;");
    }
}
