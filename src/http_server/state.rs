use crate::lastfm::LastfmClient;
use crate::services::recommend::RecommendService;
use crate::spotify::SpotifyCatalog;

pub struct AppState {
    pub service: RecommendService<SpotifyCatalog, LastfmClient>,
}
