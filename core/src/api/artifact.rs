/// Downloadable result artifacts and the local filenames they land under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Tracks,
    Report,
    Bundle,
}

impl Artifact {
    pub const ALL: [Artifact; 3] = [Artifact::Tracks, Artifact::Report, Artifact::Bundle];

    pub fn path(&self) -> &'static str {
        match self {
            Artifact::Tracks => "results/tracks.json",
            Artifact::Report => "results/statistics_report.txt",
            Artifact::Bundle => "download-all",
        }
    }

    pub fn filename(&self) -> &'static str {
        match self {
            Artifact::Tracks => "traffic_tracks.json",
            Artifact::Report => "traffic_report.txt",
            Artifact::Bundle => "traffic_analysis_results.zip",
        }
    }

    /// Download-button label.
    pub fn title(&self) -> &'static str {
        match self {
            Artifact::Tracks => "Треки (JSON)",
            Artifact::Report => "Отчет (TXT)",
            Artifact::Bundle => "Все результаты (ZIP)",
        }
    }
}
