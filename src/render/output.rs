use std::fs;
use std::path::PathBuf;

use plotters::coord::Shift;
use plotters::prelude::*;
use svg2pdf::usvg;
use svg2pdf::usvg::fontdb;
use tracing::debug;

use crate::config::{FiguresConfig, OutputFormat};
use crate::error::{FigureError, Result};

/// Where and how finished figures are written.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTarget {
    pub dir: PathBuf,
    pub format: OutputFormat,
    pub size: (u32, u32),
}

impl OutputTarget {
    pub fn new(dir: impl Into<PathBuf>, config: &FiguresConfig) -> Self {
        Self {
            dir: dir.into(),
            format: config.output.format,
            size: (config.output.width_px, config.output.height_px),
        }
    }

    pub fn path_for(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{stem}.{}", self.format.extension()))
    }
}

/// Runs `draw` on a white canvas of `size` pixels and returns the SVG text.
pub fn draw_svg<F>(size: (u32, u32), draw: F) -> Result<String>
where
    F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> Result<()>,
{
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
    }
    Ok(svg)
}

/// Installed faces tried, in order, for the generic `sans-serif` family
/// every panel's text is set in.
const SANS_SERIF_FACES: [&str; 5] = [
    "DejaVu Sans",
    "Liberation Sans",
    "Arial",
    "Helvetica",
    "Noto Sans",
];

fn has_family(db: &fontdb::Database, name: &str) -> bool {
    db.faces()
        .any(|face| face.families.iter().any(|(family, _)| family == name))
}

/// Picks the face that resolves `sans-serif`: the first preferred family
/// that is installed, else any installed family whose name contains "Sans".
pub fn sans_serif_face(db: &fontdb::Database) -> Option<String> {
    if let Some(name) = SANS_SERIF_FACES.iter().find(|name| has_family(db, name)) {
        return Some(name.to_string());
    }
    db.faces()
        .flat_map(|face| face.families.iter())
        .map(|(family, _)| family)
        .find(|family| family.contains("Sans"))
        .cloned()
}

/// usvg maps `sans-serif` to Arial unless told otherwise, and text whose
/// family does not resolve is dropped from the PDF.
fn pdf_options() -> Result<usvg::Options<'static>> {
    let mut opt = usvg::Options::default();
    let db = opt.fontdb_mut();
    db.load_system_fonts();
    let family = sans_serif_face(db).ok_or_else(|| {
        FigureError::Pdf(format!(
            "no sans-serif font installed (tried {})",
            SANS_SERIF_FACES.join(", ")
        ))
    })?;
    db.set_sans_serif_family(family.as_str());
    debug!(family = family.as_str(), "pdf text font");
    opt.font_family = family;
    Ok(opt)
}

pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>> {
    let opt = pdf_options()?;
    let tree = usvg::Tree::from_str(svg, &opt)
        .map_err(|e| FigureError::Pdf(format!("cannot parse rendered svg: {e}")))?;
    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|e| FigureError::Pdf(e.to_string()))
}

/// Encodes `svg` in the target format and writes `<dir>/<stem>.<ext>`,
/// replacing any previous file. The bytes go to a sibling temporary file
/// first and are renamed into place.
pub fn write_artefact(target: &OutputTarget, stem: &str, svg: String) -> Result<PathBuf> {
    fs::create_dir_all(&target.dir)?;
    let bytes = match target.format {
        OutputFormat::Svg => svg.into_bytes(),
        OutputFormat::Pdf => svg_to_pdf(&svg)?,
    };
    let path = target.path_for(stem);
    let tmp = target
        .dir
        .join(format!(".{stem}.{}.tmp", target.format.extension()));
    if let Err(err) = fs::write(&tmp, &bytes).and_then(|()| fs::rename(&tmp, &path)) {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }
    debug!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_dir(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "cloth_figures_output_test_{}_{}",
            name,
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        p
    }

    #[test]
    fn svg_artefact_overwrites_in_place() {
        let dir = unique_dir("svg");
        let target = OutputTarget {
            dir: dir.clone(),
            format: OutputFormat::Svg,
            size: (200, 100),
        };
        let svg = draw_svg(target.size, |_| Ok(())).unwrap();
        assert!(svg.contains("<svg"));

        let first = write_artefact(&target, "fig_test", svg.clone()).unwrap();
        let second = write_artefact(&target, "fig_test", svg).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, dir.join("fig_test.svg"));
        let names: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1, "no temporary files left behind: {names:?}");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn failed_rename_removes_temporary_file() {
        let dir = unique_dir("blocked");
        // A non-empty directory where the artefact should go cannot be replaced.
        fs::create_dir_all(dir.join("fig_blocked.svg").join("inner")).unwrap();
        let target = OutputTarget {
            dir: dir.clone(),
            format: OutputFormat::Svg,
            size: (200, 100),
        };
        let svg = draw_svg(target.size, |_| Ok(())).unwrap();
        assert!(write_artefact(&target, "fig_blocked", svg).is_err());
        assert!(!dir.join(".fig_blocked.svg.tmp").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn pdf_keeps_panel_text() {
        let svg = draw_svg((400, 200), |root| {
            root.draw(&Text::new(
                "Partition stability",
                (20, 100),
                (crate::render::style::FONT, 20.0),
            ))?;
            Ok(())
        })
        .unwrap();
        assert!(svg.contains("Partition stability"));

        let pdf = svg_to_pdf(&svg).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        assert!(
            pdf.windows(5).any(|w| w == b"/Font"),
            "text was dropped: no font resource in {} bytes",
            pdf.len()
        );
    }
}
