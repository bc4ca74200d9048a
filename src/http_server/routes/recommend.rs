use std::sync::Arc;

use axum::{
    extract::{self, State},
    http::StatusCode,
};

use crate::http_server::state::AppState;
use crate::services::recommend::manager::RecommendationSet;
use crate::services::recommend::{Candidate, Category, QueryContext};

/// Caller-facing recommendation request. `verify` must be "yes" or the
/// request is rejected before any provider call.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub is_musician: bool,
    #[serde(default)]
    pub musician_action: Option<String>,
    #[serde(default)]
    pub input_type: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub exclude_artist: Option<String>,
    #[serde(default)]
    pub verify: Option<String>,
}

/// What a validated request asks the engine to do.
#[derive(Debug, PartialEq, Eq)]
enum RequestAction {
    Find(QueryContext),
    FullSet { artist: String },
}

fn parse_request(input: &RecommendRequest) -> Result<RequestAction, String> {
    let verified = input
        .verify
        .as_deref()
        .is_some_and(|verify| verify.trim().to_lowercase() == "yes");
    if !verified {
        return Err("confirmation required: set verify to \"yes\"".to_string());
    }

    if input.is_musician && input.musician_action.as_deref() == Some("update") {
        let artist = input
            .query
            .as_deref()
            .map(str::trim)
            .filter(|query| !query.is_empty())
            .ok_or_else(|| "query (your artist name) is required for update".to_string())?;
        return Ok(RequestAction::FullSet {
            artist: artist.to_string(),
        });
    }

    let input_type = input
        .input_type
        .as_deref()
        .ok_or_else(|| "input_type is required".to_string())?;
    let category = Category::parse_input_type(input_type)
        .ok_or_else(|| format!("invalid input_type: {}", input_type))?;

    let query = input
        .query
        .as_deref()
        .map(str::trim)
        .filter(|query| !query.is_empty())
        .ok_or_else(|| "query is required".to_string())?;

    let artist = input
        .artist
        .as_deref()
        .map(str::trim)
        .filter(|artist| !artist.is_empty());
    if category != Category::Artists && artist.is_none() {
        return Err(format!(
            "artist is required for {} queries",
            category.singular()
        ));
    }

    Ok(RequestAction::Find(QueryContext {
        category,
        query: query.to_string(),
        artist: artist.map(str::to_string),
        exclude_artist: input
            .exclude_artist
            .as_deref()
            .map(str::trim)
            .filter(|exclude| !exclude.is_empty())
            .map(str::to_string),
    }))
}

fn render_entry(candidate: &Candidate) -> String {
    match &candidate.entity.artist {
        Some(artist) => format!(
            "{} by {}\nlink: {}",
            candidate.entity.name, artist, candidate.entity.link
        ),
        None => format!("{}\nlink: {}", candidate.entity.name, candidate.entity.link),
    }
}

fn render_list(category: Category, candidates: &[Candidate]) -> String {
    if candidates.is_empty() {
        return category.empty_sentinel();
    }
    candidates
        .iter()
        .map(render_entry)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_set(set: &RecommendationSet) -> String {
    Category::ALL
        .iter()
        .map(|&category| format!("{}:\n{}", category, render_list(category, set.list(category))))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[axum::debug_handler]
pub async fn recommend(
    State(app_state): State<Arc<AppState>>,
    extract::Json(input): extract::Json<RecommendRequest>,
) -> (StatusCode, String) {
    let action = match parse_request(&input) {
        Ok(action) => action,
        Err(message) => return (StatusCode::BAD_REQUEST, message),
    };

    match action {
        RequestAction::Find(ctx) => {
            log::info!("Recommendation request: {} {:?}", ctx.category, ctx.query);
            let ranked = app_state.service.recommend(&ctx).await;
            (StatusCode::OK, render_list(ctx.category, &ranked))
        }
        RequestAction::FullSet { artist } => {
            log::info!("Full-set request for artist {:?}", artist);
            let set = app_state.service.full_set(&artist).await;
            (StatusCode::OK, render_set(&set))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::recommend::Entity;

    fn request() -> RecommendRequest {
        RecommendRequest {
            is_musician: false,
            musician_action: None,
            input_type: Some("artist".to_string()),
            query: Some("Daft Punk".to_string()),
            artist: None,
            exclude_artist: None,
            verify: Some("yes".to_string()),
        }
    }

    fn candidate(name: &str, artist: Option<&str>) -> Candidate {
        Candidate {
            entity: Entity {
                name: name.to_string(),
                link: format!("https://www.last.fm/music/{}", name),
                artist: artist.map(str::to_string),
            },
            popularity: None,
        }
    }

    #[test]
    fn test_request_fields_default_when_omitted() {
        let input: RecommendRequest =
            serde_json::from_str(r#"{"input_type": "artist", "query": "Daft Punk", "verify": "yes"}"#)
                .unwrap();
        assert!(!input.is_musician);
        assert!(matches!(
            parse_request(&input),
            Ok(RequestAction::Find(ctx)) if ctx.category == Category::Artists
        ));
    }

    #[test]
    fn test_unverified_request_is_rejected() {
        let mut input = request();
        input.verify = Some("no".to_string());
        assert!(parse_request(&input).is_err());

        input.verify = None;
        assert!(parse_request(&input).is_err());
    }

    #[test]
    fn test_album_query_requires_artist() {
        let mut input = request();
        input.input_type = Some("album".to_string());
        input.query = Some("Discovery".to_string());
        let error = parse_request(&input).unwrap_err();
        assert_eq!(error, "artist is required for album queries");

        input.artist = Some("Daft Punk".to_string());
        assert!(matches!(
            parse_request(&input),
            Ok(RequestAction::Find(ctx)) if ctx.category == Category::Albums
        ));
    }

    #[test]
    fn test_invalid_input_type_is_rejected() {
        let mut input = request();
        input.input_type = Some("podcast".to_string());
        assert_eq!(
            parse_request(&input).unwrap_err(),
            "invalid input_type: podcast"
        );
    }

    #[test]
    fn test_musician_update_builds_full_set_action() {
        let mut input = request();
        input.is_musician = true;
        input.musician_action = Some("update".to_string());
        assert_eq!(
            parse_request(&input).unwrap(),
            RequestAction::FullSet {
                artist: "Daft Punk".to_string()
            }
        );
    }

    #[test]
    fn test_render_entry_with_and_without_artist() {
        assert_eq!(
            render_entry(&candidate("Cross", Some("Justice"))),
            "Cross by Justice\nlink: https://www.last.fm/music/Cross"
        );
        assert_eq!(
            render_entry(&candidate("Justice", None)),
            "Justice\nlink: https://www.last.fm/music/Justice"
        );
    }

    #[test]
    fn test_render_list_empty_uses_sentinel() {
        assert_eq!(render_list(Category::Albums, &[]), "no similar albums found");
    }

    #[test]
    fn test_render_set_lists_every_category() {
        let set = RecommendationSet::from_parts(
            vec![candidate("Breakbot", None)],
            Vec::new(),
            Vec::new(),
        );
        let rendered = render_set(&set);
        assert!(rendered.starts_with("artists:\nBreakbot\n"));
        assert!(rendered.contains("no similar albums found"));
        assert!(rendered.contains("no similar songs found"));
    }
}
