use console::style;
use kmreview_core::{
    GroupOwner, KeyMoment, Session, VideoInfo, format_clock, format_timestamp, group_sentences,
    moment_duration, time_range_of,
};

pub fn rule() -> String {
    style("─".repeat(60)).dim().to_string()
}

fn progress_label(video: &VideoInfo) -> String {
    let (reviewed, total) = video.review_progress();
    let label = format!("{reviewed}/{total} reviewed");
    if video.is_fully_reviewed() {
        style(label).green().to_string()
    } else {
        style(label).yellow().to_string()
    }
}

pub fn item_line(video: &VideoInfo) -> String {
    format!(
        "{}  {}  {}  {}",
        style(&video.mid).cyan().bold(),
        video.name,
        style(format!(
            "grade {} · {} · ch. {} · {}",
            video.grade,
            video.subject,
            video.chapter,
            format_timestamp(video.duration)
        ))
        .dim(),
        progress_label(video)
    )
}

pub fn session_listing(session: &Session) -> String {
    let mut lines: Vec<String> = session.items().values().map(item_line).collect();
    for skipped in session.skipped() {
        lines.push(format!(
            "{}  {}",
            style(&skipped.mid).red().bold(),
            style(&skipped.error).dim()
        ));
    }
    if lines.is_empty() {
        lines.push(style("(empty session)").dim().to_string());
    }
    lines.join("\n")
}

/// One moment, numbered and with SL bounds 1-based as in the session file.
pub fn moment_line(video: &VideoInfo, index: usize, moment: &KeyMoment, selected: bool) -> String {
    let marker = if moment.is_reviewed {
        style("✓").green().bold()
    } else {
        style("·").dim()
    };
    let cursor = if selected { ">" } else { " " };
    let range = moment.sentence_range;
    let timing = match (
        time_range_of(&video.sentences, range),
        moment_duration(&video.sentences, range),
    ) {
        (Some(time), Some(duration)) => format!(
            " [{} - {}, {}]",
            format_timestamp(time.start),
            format_timestamp(time.end),
            format_clock(duration)
        ),
        _ => String::new(),
    };

    format!(
        "{cursor}{marker} {:>2}. SL {}-{}{}  {}\n      {} {}\n      {} {}",
        index + 1,
        range.start + 1,
        range.end + 1,
        style(timing).dim(),
        style(&moment.title).bold(),
        style("Concept:").dim(),
        moment.concept,
        style("Takeaway:").dim(),
        moment.key_takeaway
    )
}

pub fn item_detail(video: &VideoInfo, selected: Option<usize>) -> String {
    let mut out = vec![item_line(video), rule()];
    if video.key_moments.is_empty() {
        out.push(style("No key moments").dim().to_string());
    }
    for (index, moment) in video.key_moments.iter().enumerate() {
        out.push(moment_line(video, index, moment, selected == Some(index)));
    }
    out.join("\n")
}

/// Transcript text split at moment boundaries.
pub fn transcript(video: &VideoInfo) -> String {
    let mut out = Vec::new();
    for group in group_sentences(video.sentences.len(), &video.key_moments) {
        let header = match group.owner {
            GroupOwner::Moment(index) => video
                .key_moments
                .get(index)
                .map(|m| style(format!("[{}] {}", index + 1, m.title)).cyan().bold().to_string())
                .unwrap_or_default(),
            GroupOwner::Unassigned => style("[unassigned]").dim().to_string(),
        };
        out.push(header);

        let text: Vec<&str> = video.sentences[group.range.start..=group.range.end]
            .iter()
            .map(|s| s.text.as_str())
            .collect();
        out.push(format!("  {}", text.join(" ")));
    }
    out.join("\n")
}
