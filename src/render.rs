//! Heatmap rendering with plotters

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
// The config `Color` struct below shadows the prelude's `Color` trait by
// name; re-import the trait anonymously so the style helpers on
// `RGBColor`/`BLACK` keep resolving.
use plotters::style::Color as _;
use plotters::style::FontTransform;
use serde::{Deserialize, Serialize};

use crate::classify::{Category, Thresholds};
use crate::error::{CnvError, Result};
use crate::matrix::HeatmapMatrix;

/// RGB color, configurable as a `#rrggbb` hex string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn rgb(&self) -> RGBColor {
        RGBColor(self.r, self.g, self.b)
    }
}

impl std::str::FromStr for Color {
    type Err = CnvError;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CnvError::Config {
                reason: format!("Invalid color '{}'; expected #rrggbb", s),
            });
        }
        let parse = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| CnvError::Config {
                reason: format!("Invalid color '{}'; expected #rrggbb", s),
            })
        };
        Ok(Self {
            r: parse(0..2)?,
            g: parse(2..4)?,
            b: parse(4..6)?,
        })
    }
}

impl TryFrom<String> for Color {
    type Error = CnvError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
    }
}

/// Category-to-color mapping for heatmap cells
///
/// Defaults match the legacy palette: light blue for gains, light coral for
/// losses, white for normal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorMap {
    pub gain: Color,
    pub loss: Color,
    pub normal: Color,
}

impl Default for ColorMap {
    fn default() -> Self {
        Self {
            gain: Color::new(0xad, 0xd8, 0xe6),
            loss: Color::new(0xf0, 0x80, 0x80),
            normal: Color::new(0xff, 0xff, 0xff),
        }
    }
}

impl ColorMap {
    pub fn color_for(&self, category: Category) -> Color {
        match category {
            Category::Gain => self.gain,
            Category::Loss => self.loss,
            Category::Normal => self.normal,
        }
    }
}

// Grid geometry. Margins grow with label lengths so large cohorts and long
// exon descriptions never collide with the grid.
const CELL_W: i32 = 64;
const CELL_H: i32 = 40;
const CHAR_W: i32 = 7;
const TITLE_H: i32 = 34;
const LEGEND_H: i32 = 26;
const PAD: i32 = 12;

struct Layout {
    group_w: i32,
    grid_left: i32,
    grid_top: i32,
    width: u32,
    height: u32,
}

fn layout(matrix: &HeatmapMatrix) -> Layout {
    let max_group = matrix.rows().iter().map(|r| r.group.len()).max().unwrap_or(0) as i32;
    let max_sample = matrix
        .rows()
        .iter()
        .map(|r| r.sample.len())
        .max()
        .unwrap_or(0) as i32;
    let max_column = matrix.columns().iter().map(|c| c.len()).max().unwrap_or(0) as i32;

    let group_w = max_group * CHAR_W + 2 * PAD;
    let sample_w = max_sample * CHAR_W + 2 * PAD;
    let grid_left = group_w + sample_w;
    let grid_top = TITLE_H + LEGEND_H;
    let bottom_h = max_column * CHAR_W + 2 * PAD;

    let width = (grid_left + matrix.n_columns() as i32 * CELL_W + 2 * PAD).max(560) as u32;
    let height = (grid_top + matrix.n_rows() as i32 * CELL_H + bottom_h) as u32;

    Layout {
        group_w,
        grid_left,
        grid_top,
        width,
        height,
    }
}

/// Canvas dimensions in pixels for a given matrix
pub fn canvas_size(matrix: &HeatmapMatrix) -> (u32, u32) {
    let l = layout(matrix);
    (l.width, l.height)
}

fn draw_err<E: std::fmt::Display>(e: E) -> CnvError {
    CnvError::Render {
        reason: e.to_string(),
    }
}

/// Render the matrix as an annotated PNG heatmap
///
/// Single pass, no recovery: an empty matrix errors before any file is
/// touched. Each cell is filled with its category color, outlined in black,
/// and annotated with the literal ratio at two decimals ("NA" for a
/// malformed value). Rows are labeled with sample names and grouped by pair
/// label with a thick separator between pairs; alternate pairs get a pale
/// grey tint. Column labels are the region descriptions, rotated vertical,
/// in the gene table's genomic order.
pub fn render_heatmap(
    matrix: &HeatmapMatrix,
    colors: &ColorMap,
    thresholds: &Thresholds,
    title: &str,
    path: &std::path::Path,
) -> Result<()> {
    if matrix.is_empty() {
        return Err(CnvError::Render {
            reason: "Cannot render an empty matrix".to_string(),
        });
    }

    let l = layout(matrix);
    let root = BitMapBackend::new(path, (l.width, l.height)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let label_font = ("sans-serif", 13).into_font().color(&BLACK);
    let cell_font = ("sans-serif", 12)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));

    // Title
    root.draw(&Text::new(
        title.to_string(),
        (l.width as i32 / 2, TITLE_H / 2),
        ("sans-serif", 20)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center)),
    ))
    .map_err(draw_err)?;

    // Legend: one swatch per category with its classification rule
    let legend_y = TITLE_H + LEGEND_H / 2;
    let mut legend_x = l.grid_left;
    let entries = [
        (colors.gain, format!("Gain (>= {})", thresholds.gain)),
        (colors.loss, format!("Loss (<= {})", thresholds.loss)),
        (colors.normal, "Normal".to_string()),
    ];
    for (color, text) in &entries {
        root.draw(&Rectangle::new(
            [(legend_x, legend_y - 7), (legend_x + 14, legend_y + 7)],
            color.rgb().filled(),
        ))
        .map_err(draw_err)?;
        root.draw(&Rectangle::new(
            [(legend_x, legend_y - 7), (legend_x + 14, legend_y + 7)],
            BLACK.stroke_width(1),
        ))
        .map_err(draw_err)?;
        root.draw(&Text::new(
            text.clone(),
            (legend_x + 20, legend_y),
            label_font.clone().pos(Pos::new(HPos::Left, VPos::Center)),
        ))
        .map_err(draw_err)?;
        legend_x += 20 + text.len() as i32 * CHAR_W + 2 * PAD;
    }

    let grid_right = l.grid_left + matrix.n_columns() as i32 * CELL_W;
    let grid_bottom = l.grid_top + matrix.n_rows() as i32 * CELL_H;

    // Cells: fill, border, value annotation
    for i in 0..matrix.n_rows() {
        for j in 0..matrix.n_columns() {
            let x0 = l.grid_left + j as i32 * CELL_W;
            let y0 = l.grid_top + i as i32 * CELL_H;
            let fill = colors.color_for(matrix.category(i, j)).rgb();
            root.draw(&Rectangle::new(
                [(x0, y0), (x0 + CELL_W, y0 + CELL_H)],
                fill.filled(),
            ))
            .map_err(draw_err)?;
            root.draw(&Rectangle::new(
                [(x0, y0), (x0 + CELL_W, y0 + CELL_H)],
                BLACK.stroke_width(1),
            ))
            .map_err(draw_err)?;

            let ratio = matrix.ratio(i, j);
            let text = if ratio.is_nan() {
                "NA".to_string()
            } else {
                format!("{:.2}", ratio)
            };
            root.draw(&Text::new(
                text,
                (x0 + CELL_W / 2, y0 + CELL_H / 2),
                cell_font.clone(),
            ))
            .map_err(draw_err)?;
        }
    }

    // Row labels: sample name per row, group label once per pair
    for (i, row) in matrix.rows().iter().enumerate() {
        let y = l.grid_top + i as i32 * CELL_H + CELL_H / 2;
        root.draw(&Text::new(
            row.sample.clone(),
            (l.group_w + PAD, y),
            label_font.clone().pos(Pos::new(HPos::Left, VPos::Center)),
        ))
        .map_err(draw_err)?;

        if i % 2 == 0 {
            let pair_mid = l.grid_top + i as i32 * CELL_H + CELL_H;
            root.draw(&Text::new(
                row.group.clone(),
                (PAD, pair_mid),
                label_font.clone().pos(Pos::new(HPos::Left, VPos::Center)),
            ))
            .map_err(draw_err)?;
        }
    }

    // Thick separator between sample pairs
    for pair in 1..matrix.n_rows() / 2 {
        let y = l.grid_top + pair as i32 * 2 * CELL_H;
        root.draw(&PathElement::new(
            vec![(0, y), (grid_right, y)],
            BLACK.stroke_width(3),
        ))
        .map_err(draw_err)?;
    }

    // Pale tint over every other pair to aid scanning wide matrices
    for pair in (0..matrix.n_rows() / 2).step_by(2) {
        let y0 = l.grid_top + pair as i32 * 2 * CELL_H;
        root.draw(&Rectangle::new(
            [(0, y0), (grid_right, y0 + 2 * CELL_H)],
            RGBColor(180, 180, 180).mix(0.15).filled(),
        ))
        .map_err(draw_err)?;
    }

    // Column labels, rotated to run downward under their column
    for (j, column) in matrix.columns().iter().enumerate() {
        let x = l.grid_left + j as i32 * CELL_W + CELL_W / 2;
        root.draw(&Text::new(
            column.clone(),
            (x, grid_bottom + PAD / 2),
            ("sans-serif", 13)
                .into_font()
                .transform(FontTransform::Rotate90)
                .color(&BLACK)
                .pos(Pos::new(HPos::Left, VPos::Center)),
        ))
        .map_err(draw_err)?;
    }

    root.present().map_err(draw_err)?;
    log::debug!(
        "Rendered {}x{} heatmap ({}x{} px) to {}",
        matrix.n_rows(),
        matrix.n_columns(),
        l.width,
        l.height,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Thresholds;
    use crate::data::{select_gene, GeneMatch, RegionTable, SortOrder, TableSchema};
    use crate::matrix::{build_matrix, SamplePair};

    fn toy_matrix(n_pairs: usize, long_labels: bool) -> HeatmapMatrix {
        let columns = vec![
            "Description".to_string(),
            "Chr Start_x".to_string(),
            "S1".to_string(),
            "S2".to_string(),
        ];
        let desc = if long_labels {
            "GeneX Exon1 chr13:32315474-32315667".to_string()
        } else {
            "Exon1".to_string()
        };
        let rows = vec![vec![
            desc,
            "100".to_string(),
            "1.5".to_string(),
            "0.9".to_string(),
        ]];
        let table = RegionTable::new(columns, rows, &TableSchema::default()).unwrap();
        let gene = select_gene(&table, &GeneMatch::Description, "Exon", SortOrder::Ascending);
        let pairs: Vec<SamplePair> = (0..n_pairs)
            .map(|i| SamplePair {
                first: "S1".to_string(),
                second: "S2".to_string(),
                label: format!("Pair {}", i + 1),
            })
            .collect();
        build_matrix(&gene, &pairs, &Thresholds::default()).unwrap()
    }

    #[test]
    fn test_color_hex_round_trip() {
        let c: Color = "#add8e6".parse().unwrap();
        assert_eq!(c, Color::new(0xad, 0xd8, 0xe6));
        assert_eq!(String::from(c), "#add8e6");
        assert!("not-a-color".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
    }

    #[test]
    fn test_cell_styles_from_configured_colors() {
        let fill = ColorMap::default().loss.rgb().filled();
        assert!(fill.filled);
        let border = BLACK.stroke_width(1);
        assert_eq!(border.stroke_width, 1);
        let tint = RGBColor(180, 180, 180).mix(0.15).filled();
        assert!(tint.filled);
    }

    #[test]
    fn test_default_palette() {
        let map = ColorMap::default();
        assert_eq!(map.color_for(Category::Gain), Color::new(0xad, 0xd8, 0xe6));
        assert_eq!(map.color_for(Category::Loss), Color::new(0xf0, 0x80, 0x80));
        assert_eq!(map.color_for(Category::Normal), Color::new(0xff, 0xff, 0xff));
    }

    #[test]
    fn test_draw_failures_map_to_render_errors() {
        let e = draw_err("font unavailable");
        assert!(matches!(e, CnvError::Render { reason } if reason == "font unavailable"));
    }

    #[test]
    fn test_canvas_scales_with_matrix_and_labels() {
        let (w1, h1) = canvas_size(&toy_matrix(1, false));
        let (w2, h2) = canvas_size(&toy_matrix(3, false));
        assert_eq!(w1, w2);
        assert!(h2 > h1);

        let (_, h_long) = canvas_size(&toy_matrix(1, true));
        assert!(h_long > h1);
    }

    #[test]
    #[ignore = "draws text; requires a system font"]
    fn test_render_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heatmap.png");
        let matrix = toy_matrix(2, false);
        render_heatmap(
            &matrix,
            &ColorMap::default(),
            &Thresholds::default(),
            "CNV Heatmap",
            &path,
        )
        .unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
