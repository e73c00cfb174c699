//! Chart classification from notebook cell source.
//!
//! A chart is described by what kind of plot the cell draws and which
//! census field it is about. Both are guessed from keywords in the
//! lowercased cell source, in a fixed precedence order.

use serde::Serialize;
use strum_macros::{AsRefStr, Display};

/// Plot type drawn by a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ChartKind {
    Histogram,
    Bar,
    Pie,
    Scatter,
    BoxPlot,
    Heatmap,
    /// A figure with more than three axes.
    MultiPanel,
    /// Mentions a distribution without a recognizable plot call.
    Distribution,
    /// No plot keyword matched.
    Unknown,
}

/// Census field a chart is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ChartSubject {
    Height,
    TrunkDiameter,
    Canopy,
    Region,
    Species,
    Neighbourhood,
    HeightVsDiameter,
    Phytosanitary,
}

/// Kind and subject of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDescription {
    /// Plot type.
    pub kind: ChartKind,
    /// Field the chart is about, when one was recognized.
    pub subject: Option<ChartSubject>,
}

const PREFIX: &str = "Este gráfico evidencia ";

fn any(code: &str, words: &[&str]) -> bool {
    words.iter().any(|w| code.contains(w))
}

fn species(code: &str) -> bool {
    any(code, &["especie", "nome_popular"])
}

impl ChartDescription {
    /// Classifies a cell from its lowercased source and figure axes count.
    #[must_use]
    pub fn classify(code: &str, axes: u32) -> Self {
        use ChartKind as K;
        use ChartSubject as S;

        let (kind, subject) = if code.contains("hist") {
            let subject = if code.contains("altura") {
                Some(S::Height)
            } else if code.contains("dap") {
                Some(S::TrunkDiameter)
            } else if code.contains("copa") {
                Some(S::Canopy)
            } else if code.contains("rpa") {
                Some(S::Region)
            } else {
                None
            };
            (K::Histogram, subject)
        } else if code.contains("bar") {
            let subject = if species(code) {
                Some(S::Species)
            } else if code.contains("rpa") {
                Some(S::Region)
            } else if code.contains("bairro") {
                Some(S::Neighbourhood)
            } else {
                None
            };
            (K::Bar, subject)
        } else if any(code, &["pie", "pizza"]) {
            let subject = if species(code) {
                Some(S::Species)
            } else if code.contains("rpa") {
                Some(S::Region)
            } else {
                None
            };
            (K::Pie, subject)
        } else if code.contains("scatter") {
            let both = code.contains("altura") && code.contains("dap");
            (K::Scatter, both.then_some(S::HeightVsDiameter))
        } else if code.contains("box") {
            (K::BoxPlot, None)
        } else if any(code, &["heatmap", "heat map"]) {
            (K::Heatmap, None)
        } else if axes > 3 {
            (K::MultiPanel, None)
        } else if code.contains("distribu") {
            (K::Distribution, None)
        } else if any(code, &["fitossanid", "saude", "condicao"]) {
            (K::Unknown, Some(S::Phytosanitary))
        } else if species(code) {
            (K::Unknown, Some(S::Species))
        } else if code.contains("rpa") {
            (K::Unknown, Some(S::Region))
        } else {
            (K::Unknown, None)
        };

        Self { kind, subject }
    }

    /// Dashboard caption for the chart.
    ///
    /// Charts with no recognizable kind or subject fall back to the
    /// markdown title, when there is one.
    #[must_use]
    pub fn caption(&self, markdown_title: Option<&str>) -> String {
        use ChartKind as K;
        use ChartSubject as S;

        let body = match (self.kind, self.subject) {
            (K::Histogram, Some(S::Height)) => "a distribuição das alturas das árvores no Recife",
            (K::Histogram, Some(S::TrunkDiameter)) => {
                "a distribuição do DAP (diâmetro à altura do peito) das árvores"
            }
            (K::Histogram, Some(S::Canopy)) => "a distribuição do tamanho das copas das árvores",
            (K::Histogram, Some(S::Region)) => {
                "a distribuição das árvores por RPA (Região Político-Administrativa)"
            }
            (K::Histogram, _) => "a distribuição de uma característica das árvores no Recife",
            (K::Bar, Some(S::Species)) => "a quantidade de árvores por espécie no Recife",
            (K::Bar, Some(S::Region)) => "a quantidade de árvores por RPA no Recife",
            (K::Bar, Some(S::Neighbourhood)) => "a quantidade de árvores por bairro no Recife",
            (K::Bar, _) => "a comparação de quantidades entre diferentes categorias",
            (K::Pie, Some(S::Species)) => "a proporção de árvores por espécie no Recife",
            (K::Pie, Some(S::Region)) => "a proporção de árvores por RPA no Recife",
            (K::Pie, _) => "a proporção de distribuição de árvores por categoria",
            (K::Scatter, Some(S::HeightVsDiameter)) => "a relação entre altura e DAP das árvores",
            (K::Scatter, _) => "a relação entre duas variáveis das árvores",
            (K::BoxPlot, _) => "a distribuição e variabilidade de características das árvores",
            (K::Heatmap, _) => "a concentração e distribuição espacial das árvores no Recife",
            (K::MultiPanel, _) => {
                "múltiplas análises estatísticas sobre diferentes características das árvores no Recife"
            }
            (K::Distribution, _) => "a distribuição espacial ou estatística das árvores no Recife",
            (K::Unknown, Some(S::Phytosanitary)) => "a condição fitossanitária das árvores no Recife",
            (K::Unknown, Some(S::Species)) => "informações sobre as espécies de árvores no Recife",
            (K::Unknown, Some(S::Region)) => "a distribuição das árvores por RPA no Recife",
            (K::Unknown, _) => {
                return match markdown_title {
                    Some(title) => format!("{PREFIX}{}", title.to_lowercase()),
                    None => format!("{PREFIX}características e padrões das árvores no Recife"),
                };
            }
        };

        format!("{PREFIX}{body}")
    }

    /// Whether the chart duplicates a live dashboard chart.
    ///
    /// Bar charts of trees per region are handled by the gallery, which
    /// only drops the first two.
    #[must_use]
    pub fn duplicates_dashboard(&self, axes: u32) -> bool {
        match (self.kind, self.subject) {
            (ChartKind::Histogram, Some(ChartSubject::Canopy)) => axes == 3,
            (ChartKind::Scatter, None) => axes == 1,
            (ChartKind::Pie, Some(ChartSubject::Region)) => true,
            _ => false,
        }
    }

    /// Whether this is a bar chart of trees per region.
    #[must_use]
    pub fn is_region_bar(&self) -> bool {
        self.kind == ChartKind::Bar && self.subject == Some(ChartSubject::Region)
    }
}
