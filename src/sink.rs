use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::OutputFormat;

/// An encoded figure ready to be shown or stored
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFigure {
    /// Stable figure name, e.g. `numeric_distributions`
    pub name: String,
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
}

/// Where finished figures go. Each figure is emitted once, in render order.
pub trait FigureSink {
    fn emit(&mut self, figure: RenderedFigure) -> Result<()>;
}

/// Collect figures in memory
impl FigureSink for Vec<RenderedFigure> {
    fn emit(&mut self, figure: RenderedFigure) -> Result<()> {
        self.push(figure);
        Ok(())
    }
}

/// Writes each figure to `<dir>/<NN>_<name>.<ext>`, numbered from 01
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    /// Create the directory if needed
    pub fn create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        Ok(DirectorySink {
            dir: dir.to_path_buf(),
            written: Vec::new(),
        })
    }

    /// Files written so far
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FigureSink for DirectorySink {
    fn emit(&mut self, figure: RenderedFigure) -> Result<()> {
        let file_name = format!(
            "{:02}_{}.{}",
            self.written.len() + 1,
            figure.name,
            figure.format.extension()
        );
        let path = self.dir.join(file_name);
        fs::write(&path, &figure.bytes)
            .with_context(|| format!("Failed to write figure {}", path.display()))?;
        info!("Wrote {} ({} bytes)", path.display(), figure.bytes.len());
        self.written.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn figure(name: &str) -> RenderedFigure {
        RenderedFigure {
            name: name.to_string(),
            format: OutputFormat::Svg,
            bytes: b"<svg/>".to_vec(),
        }
    }

    #[test]
    fn test_vec_sink_keeps_order() {
        let mut sink: Vec<RenderedFigure> = Vec::new();
        sink.emit(figure("a")).unwrap();
        sink.emit(figure("b")).unwrap();
        let names: Vec<&str> = sink.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_directory_sink_numbers_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("figs");
        let mut sink = DirectorySink::create(&out).unwrap();
        sink.emit(figure("numeric_distributions")).unwrap();
        sink.emit(figure("correlation_matrix")).unwrap();

        assert_eq!(
            sink.written(),
            &[
                out.join("01_numeric_distributions.svg"),
                out.join("02_correlation_matrix.svg"),
            ]
        );
        assert_eq!(fs::read(out.join("02_correlation_matrix.svg")).unwrap(), b"<svg/>");
    }
}
