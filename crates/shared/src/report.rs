//! Typed view of the model's newsletter text.
//!
//! The analyzer asks for every section title alone on its own line wrapped in
//! `**`. [`AnalysisReport::parse`] splits on those marker lines. Text without
//! any marker becomes one unheaded section.

/// The five newsletter sections, in the order the prompt mandates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Headline,
    WhatsNew,
    BusinessMoves,
    WhyItMatters,
    BottomLine,
}

impl SectionKind {
    pub const ALL: [SectionKind; 5] = [
        SectionKind::Headline,
        SectionKind::WhatsNew,
        SectionKind::BusinessMoves,
        SectionKind::WhyItMatters,
        SectionKind::BottomLine,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SectionKind::Headline => "HEADLINE OF THE DAY",
            SectionKind::WhatsNew => "WHAT'S NEW",
            SectionKind::BusinessMoves => "BUSINESS MOVES",
            SectionKind::WhyItMatters => "WHY IT MATTERS",
            SectionKind::BottomLine => "BOTTOM LINE",
        }
    }

    /// Business moves may legitimately be skipped by the model.
    pub fn is_optional(&self) -> bool {
        matches!(self, SectionKind::BusinessMoves)
    }

    pub fn from_heading(heading: &str) -> Option<Self> {
        let normalized = normalize_heading(heading);
        Self::ALL.into_iter().find(|kind| {
            let title = kind.title();
            normalized == title || (*kind == SectionKind::Headline && normalized == "HEADLINE")
        })
    }
}

fn normalize_heading(heading: &str) -> String {
    heading
        .trim()
        .trim_end_matches(':')
        .trim()
        .replace('\u{2019}', "'")
        .to_uppercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: Option<String>,
    pub body: String,
}

impl Section {
    pub fn kind(&self) -> Option<SectionKind> {
        self.heading.as_deref().and_then(SectionKind::from_heading)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReport {
    pub raw: String,
    pub sections: Vec<Section>,
}

impl AnalysisReport {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let sections = split_sections(&raw);
        Self { raw, sections }
    }

    pub fn is_empty(&self) -> bool {
        self.raw.trim().is_empty()
    }

    /// False when the text had no marker lines at all.
    pub fn is_structured(&self) -> bool {
        self.sections.iter().any(|s| s.heading.is_some())
    }

    /// Mandated sections the model left out. The optional business section
    /// is never reported.
    pub fn missing_sections(&self) -> Vec<SectionKind> {
        SectionKind::ALL
            .into_iter()
            .filter(|kind| !kind.is_optional())
            .filter(|kind| !self.sections.iter().any(|s| s.kind() == Some(*kind)))
            .collect()
    }
}

/// Returns the inner text when `line` consists solely of `**text**`.
pub fn section_marker(line: &str) -> Option<&str> {
    let inner = line.trim().strip_prefix("**")?.strip_suffix("**")?.trim();
    if inner.is_empty() || inner.contains("**") {
        return None;
    }
    Some(inner)
}

fn split_sections(raw: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut heading: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();

    for line in raw.lines() {
        if let Some(title) = section_marker(line) {
            push_section(&mut sections, heading.take(), &body);
            body.clear();
            heading = Some(title.to_string());
        } else {
            body.push(line);
        }
    }
    push_section(&mut sections, heading, &body);

    sections
}

fn push_section(sections: &mut Vec<Section>, heading: Option<String>, body: &[&str]) {
    let body = body.join("\n").trim().to_string();
    // Leading blank text before the first marker is dropped
    if heading.is_none() && body.is_empty() {
        return;
    }
    sections.push(Section { heading, body });
}
