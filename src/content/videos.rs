//! Stage-aware video search: query variants and relevance filtering.

use crate::providers::VideoSnippet;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// Results requested per query
pub(crate) const RESULTS_PER_QUERY: u32 = 10;
/// Videos shown per stage
pub(crate) const MAX_VIDEOS: usize = 5;

const BLOCKED_TITLE_TERMS: [&str; 3] = ["#shorts", "tiktok", "meme"];
const LEARNING_TERMS: [&str; 3] = ["learn", "tutorial", "lesson"];

/// Stage heading split into its number and name
///
/// `"Stage 2: Light Reactions"` becomes `(Some("2"), "Light Reactions")`.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct StageLabel {
    pub(crate) number: Option<String>,
    pub(crate) name: String,
}

impl StageLabel {
    pub(crate) fn parse(stage: &str) -> Self {
        let number = stage
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit())
            .map(|(start, _)| {
                stage[start..]
                    .chars()
                    .take_while(char::is_ascii_digit)
                    .collect::<String>()
            });

        Self {
            number,
            name: strip_stage_prefix(stage),
        }
    }
}

/// Remove the first `Stage <n>` (with optional colon) from a heading
fn strip_stage_prefix(stage: &str) -> String {
    const PREFIX: &str = "Stage ";
    let mut search_from = 0;
    while let Some(offset) = stage[search_from..].find(PREFIX) {
        let start = search_from + offset;
        let digits_start = start + PREFIX.len();
        let digits = stage[digits_start..]
            .bytes()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits > 0 {
            let mut end = digits_start + digits;
            if stage[end..].starts_with(':') {
                end += 1;
            }
            return format!("{}{}", &stage[..start], &stage[end..])
                .trim()
                .to_string();
        }
        search_from = digits_start;
    }
    stage.trim().to_string()
}

/// The three search queries issued for a stage
pub(crate) fn search_queries(topic: &str, grade: &str, stage: &str) -> [String; 3] {
    let label = StageLabel::parse(stage);
    let focus = match &label.number {
        Some(number) => format!("stage {number}"),
        None => label.name.clone(),
    };
    [
        format!("{topic} {grade} \"{}\" -shorts", label.name),
        format!("{topic} {} tutorial -shorts", label.name),
        format!("{grade} {topic} {focus} lesson -shorts"),
    ]
}

/// Whether a search hit looks like on-topic educational material
pub(crate) fn is_educational(video: &VideoSnippet, topic: &str) -> bool {
    let title = video.title.to_lowercase();
    let description = video.description.to_lowercase();
    let topic = topic.to_lowercase();

    let blocked = BLOCKED_TITLE_TERMS.iter().any(|term| title.contains(term));
    let on_topic = title.contains(&topic) || description.contains(&topic);
    let instructional = LEARNING_TERMS
        .iter()
        .any(|term| title.contains(term) || description.contains(term));

    !blocked && on_topic && instructional
}

/// Filter, de-duplicate by id, shuffle, and keep at most [`MAX_VIDEOS`]
pub(crate) fn select<R: Rng + ?Sized>(
    candidates: Vec<VideoSnippet>,
    topic: &str,
    rng: &mut R,
) -> Vec<VideoSnippet> {
    let mut seen = HashSet::new();
    let mut videos: Vec<VideoSnippet> = candidates
        .into_iter()
        .filter(|video| is_educational(video, topic))
        .filter(|video| seen.insert(video.video_id.clone()))
        .collect();
    videos.shuffle(rng);
    videos.truncate(MAX_VIDEOS);
    videos
}
