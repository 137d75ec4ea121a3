use std::fmt;
use std::str::FromStr;

use crate::config::KrokiConfig;

#[derive(Debug, thiserror::Error)]
#[error("Unknown output format: {format}")]
pub struct ParseOutputFormatError {
    pub format: String,
}

/// Output formats the rendering service can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Svg,
    Png,
    Jpeg,
    Pdf,
    Base64,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Base64 => "base64",
        }
    }

    /// File extension used for generated artifacts.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            other => other.as_str(),
        }
    }

    /// MIME type for `<object type="...">` embeds.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Svg => "image/svg+xml",
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Pdf => "application/pdf",
            OutputFormat::Base64 => "text/plain",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ParseOutputFormatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "pdf" => Ok(Self::Pdf),
            "base64" => Ok(Self::Base64),
            _ => Err(ParseOutputFormatError {
                format: s.to_string(),
            }),
        }
    }
}

/// Config switch a diagram type sits behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Always,
    Blockdiag,
    Bpmn,
    Excalidraw,
    Mermaid,
    Diagramsnet,
}

impl Gate {
    pub fn enabled(&self, config: &KrokiConfig) -> bool {
        match self {
            Gate::Always => true,
            Gate::Blockdiag => config.enable_blockdiag,
            Gate::Bpmn => config.enable_bpmn,
            Gate::Excalidraw => config.enable_excalidraw,
            Gate::Mermaid => config.enable_mermaid,
            Gate::Diagramsnet => config.enable_diagramsnet,
        }
    }
}

/// One entry of the diagram-type catalogue.
#[derive(Debug, Clone)]
pub struct DiagramSpec {
    pub id: &'static str,
    /// Output formats the service supports for this type, in preference order.
    pub formats: &'static [OutputFormat],
    pub gate: Gate,
}

impl DiagramSpec {
    pub fn supports(&self, format: OutputFormat) -> bool {
        self.formats.contains(&format)
    }
}

use OutputFormat::{Base64, Jpeg, Pdf, Png, Svg};

const SVG_ONLY: &[OutputFormat] = &[Svg];
const RASTER_FULL: &[OutputFormat] = &[Svg, Png, Jpeg, Pdf];
const PLANTUML_LIKE: &[OutputFormat] = &[Svg, Png, Jpeg, Base64];

#[derive(Debug, Clone)]
pub struct DiagramRegistry {
    specs: Vec<DiagramSpec>,
}

impl DiagramRegistry {
    pub fn new() -> Self {
        Self { specs: Vec::new() }
    }

    pub fn add(&mut self, spec: DiagramSpec) {
        self.specs.push(spec);
    }

    pub fn add_entry(&mut self, id: &'static str, formats: &'static [OutputFormat], gate: Gate) {
        self.add(DiagramSpec { id, formats, gate });
    }

    pub fn get(&self, id: &str) -> Option<&DiagramSpec> {
        self.specs.iter().find(|spec| spec.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiagramSpec> {
        self.specs.iter()
    }

    /// The Kroki type catalogue with the service's output-format support matrix.
    pub fn default_kroki() -> Self {
        let mut reg = Self::new();

        // Always-on types.
        reg.add_entry("bytefield", SVG_ONLY, Gate::Always);
        reg.add_entry("c4plantuml", PLANTUML_LIKE, Gate::Always);
        reg.add_entry("d2", SVG_ONLY, Gate::Always);
        reg.add_entry("dbml", SVG_ONLY, Gate::Always);
        reg.add_entry("ditaa", &[Svg, Png], Gate::Always);
        reg.add_entry("erd", RASTER_FULL, Gate::Always);
        reg.add_entry("graphviz", RASTER_FULL, Gate::Always);
        reg.add_entry("nomnoml", SVG_ONLY, Gate::Always);
        reg.add_entry("pikchr", SVG_ONLY, Gate::Always);
        reg.add_entry("plantuml", PLANTUML_LIKE, Gate::Always);
        reg.add_entry("structurizr", &[Svg, Png], Gate::Always);
        reg.add_entry("svgbob", SVG_ONLY, Gate::Always);
        reg.add_entry("symbolator", SVG_ONLY, Gate::Always);
        reg.add_entry("tikz", RASTER_FULL, Gate::Always);
        reg.add_entry("umlet", &[Svg, Png, Jpeg], Gate::Always);
        reg.add_entry("vega", &[Svg, Png, Pdf], Gate::Always);
        reg.add_entry("vegalite", &[Svg, Png, Pdf], Gate::Always);
        reg.add_entry("wavedrom", SVG_ONLY, Gate::Always);
        reg.add_entry("wireviz", &[Svg, Png], Gate::Always);

        // The blockdiag family shares one gate.
        reg.add_entry("blockdiag", &[Svg, Png, Pdf], Gate::Blockdiag);
        reg.add_entry("seqdiag", &[Svg, Png, Pdf], Gate::Blockdiag);
        reg.add_entry("actdiag", &[Svg, Png, Pdf], Gate::Blockdiag);
        reg.add_entry("nwdiag", &[Svg, Png, Pdf], Gate::Blockdiag);
        reg.add_entry("packetdiag", &[Svg, Png, Pdf], Gate::Blockdiag);
        reg.add_entry("rackdiag", &[Svg, Png, Pdf], Gate::Blockdiag);

        reg.add_entry("bpmn", SVG_ONLY, Gate::Bpmn);
        reg.add_entry("excalidraw", SVG_ONLY, Gate::Excalidraw);
        reg.add_entry("mermaid", &[Svg, Png], Gate::Mermaid);
        reg.add_entry("diagramsnet", &[Svg, Png], Gate::Diagramsnet);

        reg
    }
}

impl Default for DiagramRegistry {
    fn default() -> Self {
        Self::new()
    }
}
