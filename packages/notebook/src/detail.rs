//! Long-form chart descriptions for the gallery detail view.
//!
//! Each chart gets four sections: the caption, an interpretation chosen by
//! chart kind and subject, and impact and implication notes chosen from
//! keywords in the cell source.

use serde::Serialize;

use crate::describe::{ChartDescription, ChartKind, ChartSubject};

/// One titled paragraph of a detailed description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionSection {
    pub title: String,
    pub text: String,
}

impl DescriptionSection {
    fn new(title: &str, text: &str) -> Self {
        Self {
            title: title.to_string(),
            text: text.to_string(),
        }
    }
}

pub const CAPTION_TITLE: &str = "O que o gráfico evidencia";
pub const INTERPRETATION_TITLE: &str = "Interpretação e análise";
pub const IMPACTS_TITLE: &str = "Impactos e relevância";
pub const IMPLICATIONS_TITLE: &str = "Implicações práticas e conclusões";

fn any(code: &str, words: &[&str]) -> bool {
    words.iter().any(|w| code.contains(w))
}

fn phytosanitary(code: &str) -> bool {
    any(code, &["fitossanid", "saude", "condicao"])
}

fn interpretation(chart: ChartDescription, code: &str) -> &'static str {
    use ChartKind as K;
    use ChartSubject as S;

    match (chart.kind, chart.subject) {
        (K::Histogram, Some(S::Height)) => {
            "A análise da distribuição de alturas revela padrões importantes sobre o perfil arbóreo da cidade. \
             Árvores muito altas podem representar riscos em áreas urbanas, enquanto árvores muito baixas podem indicar plantios recentes ou espécies de menor porte. \
             A concentração em determinadas faixas de altura sugere políticas de plantio específicas ou características naturais das espécies predominantes."
        }
        (K::Histogram, Some(S::TrunkDiameter)) => {
            "A distribuição do DAP (diâmetro à altura do peito) fornece insights sobre a idade e maturidade do patrimônio arbóreo. \
             Árvores com DAP maior geralmente são mais antigas e estabelecidas, oferecendo mais benefícios ecológicos, mas também requerendo mais cuidados. \
             A predominância de árvores jovens (DAP menor) pode indicar programas de reflorestamento recentes ou necessidade de planejamento para substituição."
        }
        (K::Histogram, Some(S::Canopy)) => {
            "O tamanho das copas está diretamente relacionado à capacidade de sombreamento, redução de temperatura urbana e absorção de poluentes. \
             Copas maiores oferecem mais benefícios ambientais, mas também podem causar conflitos com infraestrutura urbana. \
             A distribuição revela o potencial de serviços ecossistêmicos e ajuda a identificar áreas que necessitam de mais cobertura arbórea."
        }
        (K::Histogram, Some(S::Region)) => {
            "A distribuição por RPA evidencia desigualdades na arborização urbana entre diferentes regiões da cidade. \
             RPAs com menor densidade arbórea podem ter maior vulnerabilidade a ilhas de calor e menor qualidade de vida. \
             Essa análise é fundamental para direcionar políticas públicas de plantio e manutenção de forma equitativa."
        }
        (K::Histogram, _) => {
            "A distribuição desta característica revela padrões importantes sobre a composição e estrutura do patrimônio arbóreo urbano. \
             Identificar concentrações e variações ajuda a entender a dinâmica da arborização e a planejar intervenções estratégicas."
        }
        (K::Bar, Some(S::Species)) => {
            "A diversidade de espécies é um indicador importante da resiliência ecológica e da qualidade do ecossistema urbano. \
             A predominância de poucas espécies pode indicar vulnerabilidade a pragas ou doenças específicas. \
             Espécies nativas geralmente são mais adaptadas ao clima local e oferecem mais benefícios à fauna, enquanto espécies exóticas podem ter vantagens em ambientes urbanos. \
             Essa análise é crucial para planejar plantios futuros que promovam biodiversidade e sustentabilidade."
        }
        (K::Bar, Some(S::Region)) => {
            "A distribuição desigual de árvores entre RPAs reflete históricos diferentes de urbanização e políticas públicas. \
             Regiões centrais podem ter menos espaço para arborização, enquanto áreas periféricas podem ter mais oportunidades de plantio. \
             Essa informação é essencial para programas de equidade ambiental e planejamento urbano sustentável."
        }
        (K::Bar, Some(S::Neighbourhood)) => {
            "A variação entre bairros pode estar relacionada a fatores socioeconômicos, histórico de desenvolvimento urbano e políticas locais. \
             Bairros com menor arborização podem ter maior necessidade de intervenção para melhorar qualidade de vida e resiliência climática."
        }
        (K::Bar, _) => {
            "A comparação entre categorias revela disparidades e padrões que podem orientar políticas públicas e ações de gestão ambiental."
        }
        (K::Pie, Some(S::Species)) => {
            "A proporção de espécies indica o nível de diversidade biológica e a dependência do ecossistema urbano de poucas espécies dominantes. \
             Uma alta concentração em poucas espécies aumenta o risco de perdas significativas em caso de doenças ou eventos climáticos extremos. \
             Promover maior diversidade através de plantios estratégicos pode aumentar a resiliência do patrimônio arbóreo."
        }
        (K::Pie, Some(S::Region)) => {
            "A proporção por RPA mostra como os recursos arbóreos estão distribuídos espacialmente na cidade. \
             Desigualdades significativas podem indicar necessidade de políticas redistributivas e investimentos direcionados em áreas menos arborizadas."
        }
        (K::Pie, _) => {
            "A análise proporcional ajuda a entender a estrutura e composição do patrimônio arbóreo, identificando desequilíbrios e oportunidades de melhoria."
        }
        (K::Scatter, Some(S::HeightVsDiameter)) => {
            "A relação entre altura e DAP revela padrões de crescimento e desenvolvimento das árvores urbanas. \
             Correlações fortes indicam crescimento proporcional esperado, enquanto desvios podem sinalizar condições ambientais adversas, competição por recursos ou problemas fitossanitários. \
             Essa análise é valiosa para identificar árvores que podem necessitar de atenção especial ou que estão crescendo em condições subótimas."
        }
        (K::Scatter, _) => {
            "A relação entre variáveis ajuda a identificar correlações, tendências e padrões que podem não ser evidentes em análises isoladas. \
             Compreender essas relações é fundamental para gestão eficiente e tomada de decisões baseadas em evidências."
        }
        (K::BoxPlot, _) => {
            "Os boxplots revelam a variabilidade, distribuição e presença de valores atípicos (outliers) nas características analisadas. \
             Valores atípicos podem indicar árvores excepcionais, problemas de medição ou condições especiais que merecem investigação. \
             A variabilidade entre grupos ajuda a identificar fatores que influenciam o desenvolvimento arbóreo e a planejar intervenções direcionadas."
        }
        (K::Heatmap, _) => {
            "O mapa de calor revela concentrações espaciais de árvores, identificando áreas com maior ou menor densidade arbórea. \
             Áreas com alta concentração podem ter maior resiliência climática e qualidade ambiental, enquanto áreas com baixa concentração podem ser priorizadas para plantios. \
             Essa visualização é essencial para planejamento urbano e políticas de arborização estratégica."
        }
        // Health keywords outrank the axes count here, unlike in the caption.
        (K::MultiPanel | K::Distribution | K::Unknown, _) if phytosanitary(code) => {
            "A condição fitossanitária é um indicador crítico da saúde do patrimônio arbóreo e do risco de quedas ou acidentes. \
             Árvores em condições precárias representam riscos à segurança pública e podem indicar necessidade de podas, tratamentos ou substituições. \
             Monitorar e melhorar a saúde arbórea é essencial para garantir segurança, longevidade e benefícios contínuos à população."
        }
        (K::MultiPanel, _) => {
            "A análise multivariada permite examinar múltiplas dimensões simultaneamente, revelando padrões complexos e interações entre diferentes características. \
             Essa abordagem abrangente é valiosa para compreensão holística do patrimônio arbóreo e para planejamento estratégico de gestão."
        }
        (K::Distribution | K::Unknown, _) => {
            "A análise dos dados revela padrões importantes sobre a arborização urbana que podem orientar políticas públicas, \
             planejamento urbano e ações de gestão ambiental para promover cidades mais sustentáveis e resilientes."
        }
    }
}

fn impacts(code: &str) -> &'static str {
    if any(code, &["altura", "dap", "copa"]) {
        "Impactos práticos: O conhecimento sobre dimensões arbóreas permite planejar podas preventivas, evitar conflitos com infraestrutura (fiação, calçadas, prédios) e otimizar recursos de manutenção. \
         Árvores maiores oferecem mais benefícios ambientais (sombra, redução de temperatura, sequestro de carbono), mas também requerem mais cuidados e podem representar maiores riscos se não forem adequadamente mantidas."
    } else if any(code, &["especie", "nome_popular"]) {
        "Impactos práticos: A diversidade de espécies afeta a resiliência do ecossistema urbano, a atração de fauna, e a capacidade de adaptação a mudanças climáticas. \
         Espécies nativas geralmente são mais adaptadas e oferecem mais benefícios ecológicos, enquanto a diversidade reduz vulnerabilidade a pragas e doenças específicas."
    } else if any(code, &["rpa", "bairro"]) {
        "Impactos práticos: Desigualdades na distribuição arbórea afetam diretamente a qualidade de vida, saúde pública e resiliência climática em diferentes regiões. \
         Áreas menos arborizadas podem ter maior incidência de ilhas de calor, menor qualidade do ar e menor bem-estar da população. \
         Essas informações são fundamentais para políticas de equidade ambiental e planejamento urbano inclusivo."
    } else if phytosanitary(code) {
        "Impactos práticos: A saúde arbórea está diretamente relacionada à segurança pública, custos de manutenção e longevidade do patrimônio verde. \
         Árvores doentes ou em condições precárias representam riscos de queda, podem afetar outras árvores próximas e requerem intervenções urgentes que consomem recursos públicos."
    } else if code.contains("scatter") {
        "Impactos práticos: Compreender relações entre variáveis permite prever comportamentos, identificar anomalias e otimizar estratégias de gestão. \
         Essas correlações podem orientar critérios de seleção de espécies, planejamento de plantios e identificação de árvores que necessitam de atenção especial."
    } else {
        "Impactos práticos: A análise dos dados do censo arbóreo fornece base científica para tomada de decisões, alocação de recursos e desenvolvimento de políticas públicas eficazes. \
         Essas informações são essenciais para gestão sustentável do patrimônio verde urbano e promoção de cidades mais saudáveis e resilientes."
    }
}

fn implications(code: &str) -> &'static str {
    if code.contains("hist") {
        "Implicações práticas: A distribuição observada pode orientar políticas de plantio (priorizando espécies de determinado porte), programas de poda preventiva e planejamento de substituição de árvores antigas. \
         Conclusão: Compreender a estrutura dimensional do patrimônio arbóreo é fundamental para gestão eficiente, segurança pública e maximização de benefícios ambientais."
    } else if any(code, &["bar", "pie"]) {
        "Implicações práticas: As disparidades identificadas podem orientar programas de plantio direcionados, políticas de equidade ambiental e alocação estratégica de recursos. \
         Conclusão: A análise comparativa revela oportunidades de melhoria e é essencial para planejamento urbano sustentável e inclusivo."
    } else if code.contains("scatter") {
        "Implicações práticas: As correlações identificadas podem orientar critérios de seleção de espécies, identificação de árvores problemáticas e otimização de práticas de manejo. \
         Conclusão: Compreender relações entre variáveis melhora a capacidade de previsão e gestão proativa do patrimônio arbóreo."
    } else if phytosanitary(code) {
        "Implicações práticas: A identificação de árvores em condições precárias permite priorizar intervenções, reduzir riscos à segurança pública e otimizar recursos de manutenção. \
         Conclusão: Monitoramento contínuo da saúde arbórea é essencial para garantir segurança, longevidade e benefícios contínuos à população."
    } else {
        "Implicações práticas: Os padrões identificados fornecem base científica para políticas públicas, planejamento urbano e gestão ambiental estratégica. \
         Conclusão: A análise de dados do censo arbóreo é fundamental para promover cidades mais sustentáveis, resilientes e com melhor qualidade de vida."
    }
}

impl ChartDescription {
    /// Four-section description of the chart drawn by `code` (lowercased
    /// cell source), opening with `caption`.
    #[must_use]
    pub fn detailed_description(&self, code: &str, caption: &str) -> Vec<DescriptionSection> {
        vec![
            DescriptionSection::new(CAPTION_TITLE, caption),
            DescriptionSection::new(INTERPRETATION_TITLE, interpretation(*self, code)),
            DescriptionSection::new(IMPACTS_TITLE, impacts(code)),
            DescriptionSection::new(IMPLICATIONS_TITLE, implications(code)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn describe(code: &str, axes: u32) -> Vec<DescriptionSection> {
        let chart = ChartDescription::classify(code, axes);
        chart.detailed_description(code, &chart.caption(None))
    }

    #[test]
    fn sections_come_in_fixed_order() {
        let sections = describe("plt.hist(df['altura'])", 1);
        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![CAPTION_TITLE, INTERPRETATION_TITLE, IMPACTS_TITLE, IMPLICATIONS_TITLE]
        );
        assert_eq!(
            sections[0].text,
            "Este gráfico evidencia a distribuição das alturas das árvores no Recife"
        );
    }

    #[test]
    fn height_histogram() {
        let sections = describe("plt.hist(df['altura'])", 1);
        assert!(sections[1].text.starts_with("A análise da distribuição de alturas"));
        assert!(sections[2].text.contains("dimensões arbóreas"));
        assert!(sections[3].text.contains("estrutura dimensional"));
    }

    #[test]
    fn species_bar_chart() {
        let sections = describe("df['nome_popular'].value_counts().plot.barh()", 1);
        assert!(sections[1].text.starts_with("A diversidade de espécies"));
        assert!(sections[2].text.contains("diversidade de espécies afeta"));
        assert!(sections[3].text.contains("análise comparativa"));
    }

    #[test]
    fn region_pie_chart() {
        let sections = describe("plt.pie(df['rpa'].value_counts())", 1);
        assert!(sections[1].text.starts_with("A proporção por RPA"));
        assert!(sections[2].text.contains("Desigualdades na distribuição"));
        assert!(sections[3].text.contains("análise comparativa"));
    }

    #[test]
    fn height_against_diameter_scatter() {
        let sections = describe("plt.scatter(df['dap'], df['altura'])", 1);
        assert!(sections[1].text.starts_with("A relação entre altura e DAP"));
        assert!(sections[3].text.contains("correlações identificadas"));
    }

    #[test]
    fn box_and_heatmap() {
        assert!(describe("sns.boxplot(df['x'])", 1)[1].text.starts_with("Os boxplots"));
        assert!(describe("sns.heatmap(corr)", 1)[1].text.starts_with("O mapa de calor"));
    }

    #[test]
    fn health_keywords_outrank_axes_count() {
        let code = "df.groupby('fitossanid_grupo').size()";
        assert_eq!(ChartDescription::classify(code, 4).kind, ChartKind::MultiPanel);
        let sections = describe(code, 4);
        assert!(sections[1].text.starts_with("A condição fitossanitária"));
        assert!(sections[2].text.contains("saúde arbórea"));
        assert!(sections[3].text.contains("condições precárias"));
    }

    #[test]
    fn multi_panel_and_generic_fallbacks() {
        let multi = describe("fig, axes = plt.subplots(2, 3)", 6);
        assert!(multi[1].text.starts_with("A análise multivariada"));

        let generic = describe("plt.plot(x, y)", 1);
        assert!(generic[1].text.starts_with("A análise dos dados revela"));
        assert!(generic[2].text.contains("base científica para tomada de decisões"));
        assert!(generic[3].text.contains("Os padrões identificados"));
    }
}
