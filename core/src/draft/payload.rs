//! Typed decoders for every classified payload shape.
//!
//! Each decoder turns the raw JSON of a [`LogEvent`] into a [`ParsedEvent`]
//! the state machine can fold. Unknown fields are ignored throughout.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use super::model::{CardId, DraftType, Pack, Pick};
use crate::error::PayloadError;
use crate::log::{LogEvent, LogEventKind};

/// Picks per pack in a standard booster draft.
pub const PICKS_PER_PACK: u32 = 15;

const STATUS_PICK_NEXT: &str = "PickNext";
const STATUS_COMPLETE: &str = "Complete";

/// Keys under which the game sometimes wraps the real payload.
const WRAPPER_KEYS: &[&str] = &[
    "Draft.Notify",
    "DraftNotify",
    "Event_PlayerDraftMakePick",
    "PlayerDraftMakePick",
    "Draft.MakeHumanDraftPick",
    "MakeHumanDraftPick",
    "BotDraft_DraftPick",
    "Draft.MakePick",
    "Event_GrantCardPool",
    "EventGrantCardPool",
];

/// String-encoded payload fields that hold the real JSON object.
const STRING_PAYLOAD_KEYS: &[&str] = &["request", "Payload", "payload"];

// ─────────────────────────────────────────────────────────────────────────────
// Parsed Output
// ─────────────────────────────────────────────────────────────────────────────

/// Set and format information carried alongside a payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventHint {
    pub draft_type: Option<DraftType>,
    pub set_code: Option<String>,
}

impl EventHint {
    pub fn from_event_name(name: &str) -> Self {
        Self {
            draft_type: DraftType::from_event_name(name),
            set_code: set_code_from_event_name(name),
        }
    }

    fn with_type(draft_type: DraftType) -> Self {
        Self {
            draft_type: Some(draft_type),
            set_code: None,
        }
    }

    fn merge_name(mut self, name: Option<&str>) -> Self {
        if let Some(name) = name {
            let named = Self::from_event_name(name);
            self.draft_type = named.draft_type.or(self.draft_type);
            self.set_code = named.set_code.or(self.set_code);
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackUpdate {
    pub pack: Pack,
    pub hint: EventHint,
    /// Premier notifications name the card taken in the previous round.
    pub self_pick: Option<Pick>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedEvent {
    Pack(PackUpdate),
    /// A sealed pool, already flattened into one synthetic pack.
    Pool { pack: Pack, hint: EventHint },
    /// Coordinates of 0 mean "not present in the payload".
    Pick(Pick),
    /// The payload explicitly reports the draft as finished.
    Completed,
    Session(EventHint),
    Ignored,
}

/// Decode a classified event into something the state machine can fold.
pub fn parse_event(event: &LogEvent) -> Result<ParsedEvent, PayloadError> {
    let kind = event.kind;
    let value: Value =
        serde_json::from_str(&event.payload).map_err(|source| PayloadError::Json { kind, source })?;
    let value = unwrap_envelope(value);

    match kind {
        LogEventKind::PackContents => parse_pack_contents(event, value),
        LogEventKind::PremierNotify => parse_notify(event, value),
        LogEventKind::QuickPack => parse_quick_pack(event, value),
        LogEventKind::PlayerDraftPick
        | LogEventKind::HumanDraftPick
        | LogEventKind::BotDraftPick
        | LogEventKind::MakePickResponse => parse_pick(event, value),
        LogEventKind::GrantCardPool => parse_grant_pool(event, value),
        LogEventKind::CoursesCardPool => parse_courses_pool(event, value),
        LogEventKind::SessionInfo => parse_session_info(value),
    }
}

/// Peel wrapper objects and string-encoded payloads until a plain object
/// remains.
fn unwrap_envelope(mut value: Value) -> Value {
    for _ in 0..3 {
        let Value::Object(map) = &value else {
            break;
        };

        let wrapped = WRAPPER_KEYS
            .iter()
            .find_map(|k| map.get(*k).filter(|v| v.is_object()).cloned());
        if let Some(inner) = wrapped {
            value = inner;
            continue;
        }

        let encoded = STRING_PAYLOAD_KEYS.iter().find_map(|k| {
            map.get(*k)
                .and_then(Value::as_str)
                .and_then(|s| serde_json::from_str::<Value>(s).ok())
                .filter(Value::is_object)
        });
        match encoded {
            Some(inner) => value = inner,
            None => break,
        }
    }
    value
}

fn decode<T: DeserializeOwned>(kind: LogEventKind, value: Value) -> Result<T, PayloadError> {
    serde_json::from_value(value).map_err(|source| PayloadError::Json { kind, source })
}

// ─────────────────────────────────────────────────────────────────────────────
// Flexible Card Id Decoding
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Num(u32),
    Text(String),
}

impl RawId {
    fn into_id<E: de::Error>(self) -> Result<CardId, E> {
        match self {
            RawId::Num(n) => Ok(n),
            RawId::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid card id {s:?}"))),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawIds {
    List(Vec<RawId>),
    Joined(String),
}

/// Accepts `[1,2]`, `["1","2"]`, `"1,2"` or `null`.
fn flexible_ids<'de, D>(deserializer: D) -> Result<Vec<CardId>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawIds>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(RawIds::List(ids)) => ids.into_iter().map(RawId::into_id).collect(),
        Some(RawIds::Joined(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| RawId::Text(p.to_string()).into_id())
            .collect(),
    }
}

/// Single id given as a number or a numeric string. Missing or null is 0.
fn flexible_id<'de, D>(deserializer: D) -> Result<CardId, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(0),
        Some(raw) => raw.into_id(),
    }
}

/// `PremierDraft_TLA_20251118` -> `TLA`
pub fn set_code_from_event_name(name: &str) -> Option<String> {
    let mut parts = name.split('_');
    let _format = parts.next()?;
    let code = parts.next()?;
    let is_code = !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    is_code.then(|| code.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Pack Payloads
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CardsInPackPayload {
    #[serde(rename = "CardsInPack", deserialize_with = "flexible_ids")]
    cards: Vec<CardId>,
    #[serde(rename = "EventName", alias = "InternalEventName", default)]
    event_name: Option<String>,
}

fn parse_pack_contents(event: &LogEvent, value: Value) -> Result<ParsedEvent, PayloadError> {
    let payload: CardsInPackPayload = decode(event.kind, value)?;
    let hint = EventHint::default().merge_name(payload.event_name.as_deref());
    Ok(ParsedEvent::Pack(PackUpdate {
        pack: Pack {
            pack_number: 1,
            pick_number: 1,
            card_ids: payload.cards,
            timestamp: event.timestamp,
        },
        hint,
        self_pick: None,
    }))
}

#[derive(Deserialize)]
struct NotifyPayload {
    #[serde(rename = "PackNumber", default)]
    pack_number: u32,
    #[serde(rename = "PickNumber", default)]
    pick_number: u32,
    #[serde(rename = "SelfPack", default)]
    self_pack: u32,
    #[serde(rename = "SelfPick", default)]
    self_pick: u32,
    #[serde(rename = "DraftPack", alias = "PackCards", default, deserialize_with = "flexible_ids")]
    cards: Vec<CardId>,
    #[serde(rename = "DraftStatus", default)]
    status: Option<String>,
    #[serde(rename = "EventName", default)]
    event_name: Option<String>,
}

/// Two layouts exist. With `PackNumber`/`PickNumber`, `SelfPick` is the card
/// taken last round. Without them, `SelfPack`/`SelfPick` are the coordinates.
fn parse_notify(event: &LogEvent, value: Value) -> Result<ParsedEvent, PayloadError> {
    let payload: NotifyPayload = decode(event.kind, value)?;

    if payload.status.as_deref() == Some(STATUS_COMPLETE) {
        return Ok(ParsedEvent::Completed);
    }

    let (pack_number, pick_number, self_pick) = if payload.pack_number > 0 {
        let marker = previous_coordinate(payload.pack_number, payload.pick_number)
            .filter(|_| payload.self_pick > 0)
            .map(|(pack, pick)| Pick {
                pack_number: pack,
                pick_number: pick,
                card_id: payload.self_pick,
                timestamp: event.timestamp,
            });
        (payload.pack_number, payload.pick_number, marker)
    } else {
        (payload.self_pack, payload.self_pick, None)
    };

    if pack_number == 0 || pick_number == 0 {
        return Err(PayloadError::MissingField {
            kind: event.kind,
            field: "PackNumber",
        });
    }

    Ok(ParsedEvent::Pack(PackUpdate {
        pack: Pack {
            pack_number,
            pick_number,
            card_ids: payload.cards,
            timestamp: event.timestamp,
        },
        hint: EventHint::with_type(DraftType::Premier).merge_name(payload.event_name.as_deref()),
        self_pick,
    }))
}

/// The round before `(pack, pick)`, wrapping to the last pick of the
/// previous pack.
fn previous_coordinate(pack: u32, pick: u32) -> Option<(u32, u32)> {
    match (pack, pick) {
        (_, p) if p > 1 => Some((pack, p - 1)),
        (p, 1) if p > 1 => Some((p - 1, PICKS_PER_PACK)),
        _ => None,
    }
}

#[derive(Deserialize)]
struct QuickPackPayload {
    #[serde(rename = "PackNumber", default)]
    pack_number: u32,
    #[serde(rename = "PickNumber", default)]
    pick_number: u32,
    #[serde(rename = "DraftPack", default, deserialize_with = "flexible_ids")]
    cards: Vec<CardId>,
    #[serde(rename = "DraftStatus", default)]
    status: String,
    #[serde(rename = "EventName", default)]
    event_name: Option<String>,
}

fn parse_quick_pack(event: &LogEvent, value: Value) -> Result<ParsedEvent, PayloadError> {
    let payload: QuickPackPayload = decode(event.kind, value)?;

    match payload.status.as_str() {
        STATUS_PICK_NEXT => {}
        STATUS_COMPLETE => return Ok(ParsedEvent::Completed),
        _ => return Ok(ParsedEvent::Ignored),
    }

    Ok(ParsedEvent::Pack(PackUpdate {
        pack: Pack {
            pack_number: payload.pack_number,
            pick_number: payload.pick_number,
            card_ids: payload.cards,
            timestamp: event.timestamp,
        },
        hint: EventHint::with_type(DraftType::Quick).merge_name(payload.event_name.as_deref()),
        self_pick: None,
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Pick Payloads
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct PickInfo {
    #[serde(rename = "PackNumber", default)]
    pack_number: u32,
    #[serde(rename = "PickNumber", default)]
    pick_number: u32,
    #[serde(rename = "CardIds", alias = "CardId", default, deserialize_with = "flexible_ids")]
    card_ids: Vec<CardId>,
}

#[derive(Deserialize)]
struct PickPayload {
    #[serde(rename = "GrpId", default, deserialize_with = "flexible_id")]
    grp_id: CardId,
    #[serde(rename = "CardId", default, deserialize_with = "flexible_id")]
    card_id: CardId,
    #[serde(rename = "GrpIds", default, deserialize_with = "flexible_ids")]
    grp_ids: Vec<CardId>,
    #[serde(rename = "Pack", alias = "PackNumber", default)]
    pack: u32,
    #[serde(rename = "Pick", alias = "PickNumber", default)]
    pick: u32,
    #[serde(rename = "PickInfo", default)]
    pick_info: Option<PickInfo>,
}

impl PickPayload {
    fn chosen_card(&self) -> Option<CardId> {
        [self.grp_id, self.card_id]
            .into_iter()
            .find(|&id| id != 0)
            .or_else(|| self.grp_ids.first().copied())
            .or_else(|| {
                self.pick_info
                    .as_ref()
                    .and_then(|info| info.card_ids.first().copied())
            })
            .filter(|&id| id != 0)
    }

    fn coordinate(&self) -> (u32, u32) {
        match &self.pick_info {
            Some(info) if info.pack_number > 0 || info.pick_number > 0 => {
                (info.pack_number, info.pick_number)
            }
            _ => (self.pack, self.pick),
        }
    }
}

fn parse_pick(event: &LogEvent, value: Value) -> Result<ParsedEvent, PayloadError> {
    let payload: PickPayload = decode(event.kind, value)?;
    let card_id = payload.chosen_card().ok_or(PayloadError::MissingField {
        kind: event.kind,
        field: "GrpId",
    })?;
    let (pack_number, pick_number) = payload.coordinate();

    Ok(ParsedEvent::Pick(Pick {
        pack_number,
        pick_number,
        card_id,
        timestamp: event.timestamp,
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Sealed Pools
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct GrantedCard {
    #[serde(rename = "GrpId", alias = "grpId", deserialize_with = "flexible_id")]
    grp_id: CardId,
    #[serde(rename = "Quantity", alias = "quantity", default = "one")]
    quantity: u32,
}

fn one() -> u32 {
    1
}

#[derive(Deserialize)]
struct GrantPoolPayload {
    #[serde(rename = "CardsAdded", default)]
    cards_added: Option<Vec<GrantedCard>>,
    #[serde(rename = "CardPool", default, deserialize_with = "flexible_ids")]
    card_pool: Vec<CardId>,
    #[serde(rename = "InternalEventName", alias = "EventName", default)]
    event_name: Option<String>,
}

fn parse_grant_pool(event: &LogEvent, value: Value) -> Result<ParsedEvent, PayloadError> {
    let payload: GrantPoolPayload = decode(event.kind, value)?;

    let cards: Vec<CardId> = match payload.cards_added {
        Some(added) => added
            .iter()
            .flat_map(|c| std::iter::repeat_n(c.grp_id, c.quantity as usize))
            .collect(),
        None if !payload.card_pool.is_empty() => payload.card_pool,
        None => {
            return Err(PayloadError::MissingField {
                kind: event.kind,
                field: "CardsAdded",
            });
        }
    };

    Ok(pool_event(event, cards, payload.event_name.as_deref()))
}

#[derive(Deserialize)]
struct Course {
    #[serde(rename = "CardPool", default, deserialize_with = "flexible_ids")]
    card_pool: Vec<CardId>,
    #[serde(rename = "InternalEventName", default)]
    event_name: Option<String>,
}

#[derive(Deserialize)]
struct CoursesPayload {
    #[serde(rename = "Courses", default)]
    courses: Vec<Course>,
}

fn parse_courses_pool(event: &LogEvent, value: Value) -> Result<ParsedEvent, PayloadError> {
    let payload: CoursesPayload = decode(event.kind, value)?;
    let course = payload
        .courses
        .into_iter()
        .next()
        .ok_or(PayloadError::MissingField {
            kind: event.kind,
            field: "Courses",
        })?;

    Ok(pool_event(event, course.card_pool, course.event_name.as_deref()))
}

fn pool_event(event: &LogEvent, cards: Vec<CardId>, event_name: Option<&str>) -> ParsedEvent {
    if cards.is_empty() {
        return ParsedEvent::Ignored;
    }
    let mut hint = EventHint::with_type(DraftType::Sealed).merge_name(event_name);
    hint.draft_type = Some(DraftType::Sealed);

    ParsedEvent::Pool {
        pack: Pack {
            pack_number: 1,
            pick_number: 1,
            card_ids: cards,
            timestamp: event.timestamp,
        },
        hint,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Info
// ─────────────────────────────────────────────────────────────────────────────

/// Event join, course and course-list responses all name the event. A
/// payload without a name carries nothing to fold.
fn parse_session_info(value: Value) -> Result<ParsedEvent, PayloadError> {
    let course = value
        .get("Course")
        .or_else(|| value.get("Courses").and_then(|courses| courses.get(0)))
        .unwrap_or(&value);
    let Some(name) = course
        .get("InternalEventName")
        .or_else(|| value.get("InternalEventName"))
        .and_then(Value::as_str)
    else {
        return Ok(ParsedEvent::Ignored);
    };

    let hint = EventHint::from_event_name(name);
    if hint.draft_type.is_none() {
        return Ok(ParsedEvent::Ignored);
    }
    Ok(ParsedEvent::Session(hint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::classify_line;

    fn parse(line: &str) -> Result<ParsedEvent, PayloadError> {
        let event = classify_line(line).expect("line should classify");
        parse_event(&event)
    }

    fn expect_pack(line: &str) -> PackUpdate {
        match parse(line).unwrap() {
            ParsedEvent::Pack(update) => update,
            other => panic!("expected pack, got {other:?}"),
        }
    }

    fn expect_pick(line: &str) -> Pick {
        match parse(line).unwrap() {
            ParsedEvent::Pick(pick) => pick,
            other => panic!("expected pick, got {other:?}"),
        }
    }

    #[test]
    fn test_cards_in_pack_is_p1p1() {
        let update = expect_pack(
            r#"[2024-01-15 10:00:00] <== Event.DraftPack {"DraftId":"d","CardsInPack":[89001,89002,89003]}"#,
        );
        assert_eq!(update.pack.coordinate(), (1, 1));
        assert_eq!(update.pack.card_ids, vec![89001, 89002, 89003]);
        assert_eq!(update.hint.draft_type, None);
    }

    #[test]
    fn test_notify_with_self_pick_marker() {
        let update = expect_pack(
            r#"[2024-01-15 10:00:00] <== Draft.Notify {"PackNumber":1,"PickNumber":3,"DraftPack":[1,2],"SelfPick":777}"#,
        );
        assert_eq!(update.pack.coordinate(), (1, 3));
        assert_eq!(update.hint.draft_type, Some(DraftType::Premier));
        let marker = update.self_pick.unwrap();
        assert_eq!(marker.coordinate(), (1, 2));
        assert_eq!(marker.card_id, 777);
    }

    #[test]
    fn test_notify_marker_wraps_to_previous_pack() {
        let update = expect_pack(
            r#"[2024-01-15 10:00:00] <== Draft.Notify {"PackNumber":2,"PickNumber":1,"DraftPack":[1],"SelfPick":5}"#,
        );
        assert_eq!(update.self_pick.unwrap().coordinate(), (1, 15));

        let first = expect_pack(
            r#"[2024-01-15 10:00:00] <== Draft.Notify {"PackNumber":1,"PickNumber":1,"DraftPack":[1],"SelfPick":5}"#,
        );
        assert!(first.self_pick.is_none());
    }

    #[test]
    fn test_notify_pack_cards_string() {
        let update = expect_pack(
            r#"[2024-01-15 10:00:00] <== Draft.Notify {"draftId":"x","SelfPick":2,"SelfPack":1,"PackCards":"97530,97468,97501"}"#,
        );
        assert_eq!(update.pack.coordinate(), (1, 2));
        assert_eq!(update.pack.card_ids, vec![97530, 97468, 97501]);
        assert!(update.self_pick.is_none());
    }

    #[test]
    fn test_notify_without_coordinates_is_error() {
        let err = parse(r#"[2024-01-15 10:00:00] <== Draft.Notify {"PackCards":"1,2"}"#).unwrap_err();
        assert!(matches!(err, PayloadError::MissingField { field: "PackNumber", .. }));
    }

    #[test]
    fn test_quick_pack_statuses() {
        let update = expect_pack(
            r#"[2024-01-15 10:00:00] <== Event.DraftPack {"PackNumber":1,"PickNumber":4,"DraftPack":["11","12"],"DraftStatus":"PickNext","EventName":"QuickDraft_BLB_20240801"}"#,
        );
        assert_eq!(update.pack.coordinate(), (1, 4));
        assert_eq!(update.pack.card_ids, vec![11, 12]);
        assert_eq!(update.hint.draft_type, Some(DraftType::Quick));
        assert_eq!(update.hint.set_code.as_deref(), Some("BLB"));

        let waiting = parse(
            r#"[2024-01-15 10:00:00] <== Event.DraftPack {"PackNumber":1,"PickNumber":4,"DraftPack":[],"DraftStatus":"Waiting"}"#,
        )
        .unwrap();
        assert_eq!(waiting, ParsedEvent::Ignored);

        let done = parse(
            r#"[2024-01-15 10:00:00] <== Event.DraftPack {"DraftPack":[],"DraftStatus":"Complete"}"#,
        )
        .unwrap();
        assert_eq!(done, ParsedEvent::Completed);
    }

    #[test]
    fn test_pick_from_request_string() {
        let pick = expect_pick(
            r#"[2024-01-15 10:00:00] ==> Event_PlayerDraftMakePick {"id":"1","request":"{\"DraftId\":\"d\",\"GrpIds\":[97380],\"Pack\":1,\"Pick\":2}"}"#,
        );
        assert_eq!(pick.card_id, 97380);
        assert_eq!(pick.coordinate(), (1, 2));
    }

    #[test]
    fn test_pick_card_id_alternate_name() {
        let pick = expect_pick(
            r#"[2024-01-15 10:00:00] ==> Draft.MakeHumanDraftPick {"CardId":4242,"Pack":2,"Pick":7}"#,
        );
        assert_eq!(pick.card_id, 4242);
        assert_eq!(pick.coordinate(), (2, 7));

        let grp_wins = expect_pick(
            r#"[2024-01-15 10:00:00] ==> Draft.MakePick {"GrpId":1,"CardId":2,"Pack":1,"Pick":1}"#,
        );
        assert_eq!(grp_wins.card_id, 1);
    }

    #[test]
    fn test_pick_wrapped_under_event_name() {
        let pick = expect_pick(
            r#"[2024-01-15 10:00:00] {"Draft.MakePick":{"GrpId":"555","PackNumber":3,"PickNumber":1}}"#,
        );
        assert_eq!(pick.card_id, 555);
        assert_eq!(pick.coordinate(), (3, 1));
    }

    #[test]
    fn test_bot_draft_pick_info() {
        let pick = expect_pick(
            r#"[2024-01-15 10:00:00] ==> BotDraft_DraftPick {"request":"{\"EventName\":\"QuickDraft_BLB_20240801\",\"PickInfo\":{\"PackNumber\":1,\"PickNumber\":5,\"CardIds\":[\"90210\"]}}"}"#,
        );
        assert_eq!(pick.card_id, 90210);
        assert_eq!(pick.coordinate(), (1, 5));
    }

    #[test]
    fn test_pick_without_card_is_error() {
        let err = parse(
            r#"[2024-01-15 10:00:00] ==> Draft.MakeHumanDraftPick {"GrpId":0,"CardId":0,"Pack":1,"Pick":1}"#,
        )
        .unwrap_err();
        assert!(matches!(err, PayloadError::MissingField { field: "GrpId", .. }));
    }

    #[test]
    fn test_pick_missing_coordinates_are_zero() {
        let pick = expect_pick(r#"[2024-01-15 10:00:00] ==> Draft.MakeHumanDraftPick {"GrpId":12}"#);
        assert_eq!(pick.coordinate(), (0, 0));
    }

    #[test]
    fn test_grant_pool_expands_quantities() {
        let parsed = parse(
            r#"[2024-01-15 10:00:00] <== Event_GrantCardPool {"CardsAdded":[{"GrpId":1,"Quantity":1},{"GrpId":2,"Quantity":2},{"GrpId":3,"Quantity":1}]}"#,
        )
        .unwrap();
        let ParsedEvent::Pool { pack, hint } = parsed else {
            panic!("expected pool");
        };
        assert_eq!(pack.card_ids.len(), 4);
        assert_eq!(pack.card_ids.iter().filter(|&&id| id == 2).count(), 2);
        assert_eq!(hint.draft_type, Some(DraftType::Sealed));
    }

    #[test]
    fn test_grant_pool_flat_card_pool() {
        let parsed = parse(r#"[2024-01-15 10:00:00] <== Event_GrantCardPool {"CardPool":[5,6,7]}"#).unwrap();
        let ParsedEvent::Pool { pack, .. } = parsed else {
            panic!("expected pool");
        };
        assert_eq!(pack.card_ids, vec![5, 6, 7]);
    }

    #[test]
    fn test_grant_pool_missing_cards_is_error() {
        let err = parse(r#"[2024-01-15 10:00:00] <== Event_GrantCardPool {"Other":1}"#).unwrap_err();
        assert!(matches!(err, PayloadError::MissingField { field: "CardsAdded", .. }));
    }

    #[test]
    fn test_courses_pool() {
        let parsed = parse(
            r#"[2024-01-15 10:00:00] <== Event_GetCoursesV2 {"Courses":[{"InternalEventName":"Sealed_FDN_20241115","CardPool":[1,2,3]}]}"#,
        )
        .unwrap();
        let ParsedEvent::Pool { pack, hint } = parsed else {
            panic!("expected pool");
        };
        assert_eq!(pack.card_ids, vec![1, 2, 3]);
        assert_eq!(hint.set_code.as_deref(), Some("FDN"));
        assert_eq!(hint.draft_type, Some(DraftType::Sealed));
    }

    #[test]
    fn test_empty_courses_is_error() {
        let event = LogEvent {
            timestamp: crate::log::now(),
            stamped: false,
            kind: LogEventKind::CoursesCardPool,
            payload: r#"{"Courses":[],"CardPool":[]}"#.to_string(),
        };
        assert!(parse_event(&event).is_err());
    }

    #[test]
    fn test_session_info() {
        let parsed = parse(
            r#"[2024-01-15 09:59:00] <== EventJoin {"Course":{"CourseId":"c","InternalEventName":"PremierDraft_TLA_20251118"}}"#,
        )
        .unwrap();
        assert_eq!(
            parsed,
            ParsedEvent::Session(EventHint {
                draft_type: Some(DraftType::Premier),
                set_code: Some("TLA".to_string()),
            })
        );
    }

    #[test]
    fn test_session_info_from_course_list() {
        let parsed = parse(
            r#"[2024-01-15 09:58:00] <== Event_GetCoursesV2 {"Courses":[{"CourseId":"c","InternalEventName":"TradDraft_FDN_20241112","CurrentModule":"Draft"}]}"#,
        )
        .unwrap();
        assert_eq!(
            parsed,
            ParsedEvent::Session(EventHint {
                draft_type: Some(DraftType::Traditional),
                set_code: Some("FDN".to_string()),
            })
        );
    }

    #[test]
    fn test_session_info_without_name_is_ignored() {
        let event = LogEvent {
            timestamp: crate::log::now(),
            stamped: false,
            kind: LogEventKind::SessionInfo,
            payload: r#"{"Courses":[{"CourseId":"c"}],"InternalEventName":null}"#.to_string(),
        };
        assert_eq!(parse_event(&event).unwrap(), ParsedEvent::Ignored);
    }

    #[test]
    fn test_malformed_json_is_error() {
        let event = LogEvent {
            timestamp: crate::log::now(),
            stamped: false,
            kind: LogEventKind::QuickPack,
            payload: r#"{"DraftPack":[1,"x"],"DraftStatus":"PickNext"}"#.to_string(),
        };
        assert!(matches!(parse_event(&event), Err(PayloadError::Json { .. })));
    }

    #[test]
    fn test_set_code_from_event_name() {
        assert_eq!(set_code_from_event_name("QuickDraft_TDM_20251111").as_deref(), Some("TDM"));
        assert_eq!(set_code_from_event_name("Ladder"), None);
        assert_eq!(set_code_from_event_name("Play_lowercase"), None);
    }
}
