use chrono::NaiveDateTime;
use serde::Serialize;

use super::json::extract_json;
use super::timestamp::{now, parse_timestamp};

/// Stable tag for every payload family the tailer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LogEventKind {
    /// `CardsInPack` payload. Always the opening pack of a draft.
    PackContents,
    /// Premier draft `Draft.Notify` with the next pack's contents.
    PremierNotify,
    /// Quick draft `DraftPack`/`DraftStatus` payload.
    QuickPack,
    PlayerDraftPick,
    HumanDraftPick,
    BotDraftPick,
    MakePickResponse,
    /// Sealed pool granted as `CardsAdded` with quantities.
    GrantCardPool,
    /// Sealed pool nested under `Courses[0].CardPool`.
    CoursesCardPool,
    /// Event join/course info naming the set and format.
    SessionInfo,
}

impl LogEventKind {
    pub fn is_pick(self) -> bool {
        matches!(
            self,
            Self::PlayerDraftPick | Self::HumanDraftPick | Self::BotDraftPick | Self::MakePickResponse
        )
    }
}

/// One classified log line. Lives only until it has been folded.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub timestamp: NaiveDateTime,
    /// False when the line carried no timestamp and `timestamp` is the
    /// local clock at classification time.
    pub stamped: bool,
    pub kind: LogEventKind,
    pub payload: String,
}

/// Classify a single physical log line.
///
/// Returns `None` for anything that is not a recognized draft payload.
/// Unknown lines are routine and never an error.
pub fn classify_line(line: &str) -> Option<LogEvent> {
    let json = extract_json(line)?;
    let (kind, payload) = classify_payload(line, json)?;
    let parsed = parse_timestamp(line);
    Some(LogEvent {
        timestamp: parsed.unwrap_or_else(now),
        stamped: parsed.is_some(),
        kind,
        payload,
    })
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Order matters: specific event names are checked before the generic keys
/// they also contain.
fn classify_payload(line: &str, json: &str) -> Option<(LogEventKind, String)> {
    if json.contains(r#""CurrentModule""#) && json.contains("BotDraft") {
        return classify_bot_draft_envelope(json);
    }

    let kind = if json.contains(r#""CardsInPack""#) {
        LogEventKind::PackContents
    } else if contains_any(line, &["Draft.Notify", "DraftNotify"]) {
        LogEventKind::PremierNotify
    } else if json.contains(r#""DraftPack""#) && json.contains(r#""DraftStatus""#) {
        LogEventKind::QuickPack
    } else if line.contains("PlayerDraftMakePick") {
        LogEventKind::PlayerDraftPick
    } else if line.contains("MakeHumanDraftPick") {
        LogEventKind::HumanDraftPick
    } else if line.contains("BotDraft_DraftPick") {
        LogEventKind::BotDraftPick
    } else if line.contains("Draft.MakePick") {
        LogEventKind::MakePickResponse
    } else if contains_any(line, &["Event_GrantCardPool", "EventGrantCardPool"]) {
        LogEventKind::GrantCardPool
    } else if json.contains(r#""Courses""#) && json.contains(r#""CardPool""#) {
        LogEventKind::CoursesCardPool
    } else if json.contains(r#""InternalEventName""#) {
        LogEventKind::SessionInfo
    } else {
        return None;
    };

    Some((kind, json.to_string()))
}

/// BotDraft responses carry the real payload as an escaped JSON string.
fn classify_bot_draft_envelope(json: &str) -> Option<(LogEventKind, String)> {
    let envelope: serde_json::Value = serde_json::from_str(json).ok()?;
    if envelope.get("CurrentModule")?.as_str()? != "BotDraft" {
        return None;
    }
    let inner = envelope.get("Payload")?.as_str()?;

    if inner.contains(r#""PickInfo""#) {
        Some((LogEventKind::BotDraftPick, inner.to_string()))
    } else if inner.contains(r#""DraftPack""#) {
        Some((LogEventKind::QuickPack, inner.to_string()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(line: &str) -> Option<LogEventKind> {
        classify_line(line).map(|e| e.kind)
    }

    #[test]
    fn test_pack_contents() {
        let line = r#"[2024-01-15 10:00:00] <== Event.DraftPack {"DraftId":"d1","CardsInPack":[1,2,3]}"#;
        let event = classify_line(line).unwrap();
        assert_eq!(event.kind, LogEventKind::PackContents);
        assert_eq!(event.payload, r#"{"DraftId":"d1","CardsInPack":[1,2,3]}"#);
        assert_eq!(event.timestamp.to_string(), "2024-01-15 10:00:00");
        assert!(event.stamped);
    }

    #[test]
    fn test_premier_notify() {
        let line = r#"[2024-01-15 10:00:01] <== Draft.Notify {"SelfPick":2,"SelfPack":1,"PackCards":"97530,97468"}"#;
        assert_eq!(kind_of(line), Some(LogEventKind::PremierNotify));

        let quoted = r#"[2024-01-15 10:00:01] {"Draft.Notify":{"PackNumber":1,"PickNumber":2,"DraftPack":[5,6]}}"#;
        assert_eq!(kind_of(quoted), Some(LogEventKind::PremierNotify));
    }

    #[test]
    fn test_quick_pack() {
        let line = r#"[2024-01-15 10:00:00] <== Event.DraftPack {"PackNumber":1,"PickNumber":3,"DraftPack":[1,2],"DraftStatus":"PickNext"}"#;
        assert_eq!(kind_of(line), Some(LogEventKind::QuickPack));
    }

    #[test]
    fn test_bot_draft_envelope_pack() {
        let line = r#"[2024-01-15 10:00:00] <== BotDraft_DraftStatus {"CurrentModule":"BotDraft","Payload":"{\"DraftStatus\":\"PickNext\",\"PackNumber\":1,\"PickNumber\":1,\"DraftPack\":[\"101\",\"102\"]}"}"#;
        let event = classify_line(line).unwrap();
        assert_eq!(event.kind, LogEventKind::QuickPack);
        assert!(event.payload.starts_with(r#"{"DraftStatus":"PickNext""#));
    }

    #[test]
    fn test_bot_draft_envelope_pick() {
        let line = r#"[2024-01-15 10:00:00] <== BotDraft_DraftPick {"CurrentModule":"BotDraft","Payload":"{\"PickInfo\":{\"PackNumber\":0,\"PickNumber\":0,\"CardIds\":[\"101\"]}}"}"#;
        let event = classify_line(line).unwrap();
        assert_eq!(event.kind, LogEventKind::BotDraftPick);
        assert!(event.payload.contains("PickInfo"));
    }

    #[test]
    fn test_pick_variants() {
        assert_eq!(
            kind_of(r#"[2024-01-15 10:00:00] ==> Event_PlayerDraftMakePick {"request":"{\"GrpIds\":[97380],\"Pack\":1,\"Pick\":1}"}"#),
            Some(LogEventKind::PlayerDraftPick)
        );
        assert_eq!(
            kind_of(r#"[2024-01-15 10:00:00] ==> Draft.MakeHumanDraftPick {"GrpId":5,"Pack":1,"Pick":2}"#),
            Some(LogEventKind::HumanDraftPick)
        );
        assert_eq!(
            kind_of(r#"[2024-01-15 10:00:00] ==> BotDraft_DraftPick {"request":"{\"PickInfo\":{\"CardIds\":[\"7\"]}}"}"#),
            Some(LogEventKind::BotDraftPick)
        );
        assert_eq!(
            kind_of(r#"[2024-01-15 10:00:00] ==> Draft.MakePick {"CardId":9,"Pack":2,"Pick":4}"#),
            Some(LogEventKind::MakePickResponse)
        );
    }

    #[test]
    fn test_sealed_pools() {
        assert_eq!(
            kind_of(r#"[2024-01-15 10:00:00] <== Event_GrantCardPool {"CardsAdded":[{"GrpId":1,"Quantity":1}]}"#),
            Some(LogEventKind::GrantCardPool)
        );
        assert_eq!(
            kind_of(r#"[2024-01-15 10:00:00] <== Event_GetCoursesV2 {"Courses":[{"InternalEventName":"Sealed_TLA_20251118","CardPool":[1,2]}]}"#),
            Some(LogEventKind::CoursesCardPool)
        );
    }

    #[test]
    fn test_session_info() {
        let line = r#"[2024-01-15 09:59:00] <== EventJoin {"Course":{"CourseId":"c","InternalEventName":"PremierDraft_TLA_20251118"}}"#;
        assert_eq!(kind_of(line), Some(LogEventKind::SessionInfo));
    }

    #[test]
    fn test_no_event() {
        assert_eq!(kind_of("[2024-01-15 10:00:00] Client.SceneChange loading"), None);
        assert_eq!(kind_of(r#"[2024-01-15 10:00:00] <== Inventory {"Gems":100}"#), None);
        assert_eq!(kind_of(""), None);
    }

    #[test]
    fn test_missing_timestamp_falls_back_to_now() {
        let before = now();
        let event = classify_line(r#"<== Event.DraftPack {"CardsInPack":[1]}"#).unwrap();
        assert!(event.timestamp >= before);
        assert!(!event.stamped);
    }

    #[test]
    fn test_huge_pool_line() {
        let ids: Vec<String> = (0..20_000).map(|i| (70_000 + i).to_string()).collect();
        let line = format!(
            r#"[2024-01-15 10:00:00] <== Event_GetCoursesV2 {{"Courses":[{{"CardPool":[{}]}}]}}"#,
            ids.join(",")
        );
        let event = classify_line(&line).unwrap();
        assert_eq!(event.kind, LogEventKind::CoursesCardPool);
        assert!(event.payload.len() > 64 * 1024);
        assert!(event.payload.ends_with("]}]}"));
    }
}
