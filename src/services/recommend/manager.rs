use crate::services::recommend::{Candidate, Category, Entity, PLACEHOLDER_LINK, RESULT_SIZE};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManageError {
    #[error("cannot add more than 3 recommendations in the {0} category; remove something first")]
    CapacityExceeded(Category),
    #[error("invalid category: {0}")]
    InvalidCategory(String),
}

/// The per-session category -> candidate-list mapping edited during a manage
/// session. Exclusively owned by its session and discarded at the end; there
/// is no persistence.
#[derive(Debug, Default, Clone)]
pub struct RecommendationSet {
    artists: Vec<Candidate>,
    albums: Vec<Candidate>,
    songs: Vec<Candidate>,
}

impl RecommendationSet {
    pub fn from_parts(
        artists: Vec<Candidate>,
        albums: Vec<Candidate>,
        songs: Vec<Candidate>,
    ) -> Self {
        Self {
            artists,
            albums,
            songs,
        }
    }

    pub fn list(&self, category: Category) -> &[Candidate] {
        match category {
            Category::Artists => &self.artists,
            Category::Albums => &self.albums,
            Category::Songs => &self.songs,
        }
    }

    fn list_mut(&mut self, category: Category) -> &mut Vec<Candidate> {
        match category {
            Category::Artists => &mut self.artists,
            Category::Albums => &mut self.albums,
            Category::Songs => &mut self.songs,
        }
    }

    /// Append a manual entry. Fails when the category already holds the
    /// maximum number of recommendations; the list is left unchanged.
    pub fn add(
        &mut self,
        category: Category,
        name: String,
        link: Option<String>,
    ) -> Result<(), ManageError> {
        let list = self.list_mut(category);
        if list.len() >= RESULT_SIZE {
            return Err(ManageError::CapacityExceeded(category));
        }
        list.push(Candidate {
            entity: Entity {
                name,
                link: link.unwrap_or_else(|| PLACEHOLDER_LINK.to_string()),
                artist: None,
            },
            popularity: None,
        });
        Ok(())
    }

    /// Remove by case-insensitive exact name match. Removing an absent name
    /// is a no-op, not an error.
    pub fn remove(&mut self, category: Category, name: &str) {
        let lowered = name.to_lowercase();
        self.list_mut(category)
            .retain(|candidate| candidate.entity.name.to_lowercase() != lowered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str) -> Candidate {
        Candidate {
            entity: Entity {
                name: name.to_string(),
                link: format!("https://www.last.fm/music/{}", name),
                artist: None,
            },
            popularity: None,
        }
    }

    fn full_artists() -> RecommendationSet {
        RecommendationSet::from_parts(
            vec![candidate("Justice"), candidate("Moderat"), candidate("Breakbot")],
            Vec::new(),
            Vec::new(),
        )
    }

    #[test]
    fn test_add_at_capacity_fails_and_leaves_list_unchanged() {
        let mut set = full_artists();
        let before: Vec<Candidate> = set.list(Category::Artists).to_vec();

        let result = set.add(Category::Artists, "SebastiAn".to_string(), None);

        assert_eq!(result, Err(ManageError::CapacityExceeded(Category::Artists)));
        assert_eq!(set.list(Category::Artists), before.as_slice());
    }

    #[test]
    fn test_add_uses_placeholder_link() {
        let mut set = RecommendationSet::default();
        set.add(Category::Songs, "Baby I'm Yours".to_string(), None)
            .unwrap();

        let songs = set.list(Category::Songs);
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].entity.link, PLACEHOLDER_LINK);
    }

    #[test]
    fn test_add_keeps_supplied_link() {
        let mut set = RecommendationSet::default();
        set.add(
            Category::Albums,
            "Cross".to_string(),
            Some("https://open.spotify.com/album/cross".to_string()),
        )
        .unwrap();

        assert_eq!(
            set.list(Category::Albums)[0].entity.link,
            "https://open.spotify.com/album/cross"
        );
    }

    #[test]
    fn test_remove_is_case_insensitive() {
        let mut set = full_artists();
        set.remove(Category::Artists, "mOdErAt");

        let names: Vec<&str> = set
            .list(Category::Artists)
            .iter()
            .map(|candidate| candidate.entity.name.as_str())
            .collect();
        assert_eq!(names, vec!["Justice", "Breakbot"]);
    }

    #[test]
    fn test_remove_absent_name_is_noop() {
        let mut set = full_artists();
        let before: Vec<Candidate> = set.list(Category::Artists).to_vec();

        set.remove(Category::Artists, "Aphex Twin");

        assert_eq!(set.list(Category::Artists), before.as_slice());
    }

    #[test]
    fn test_categories_are_independent() {
        let mut set = RecommendationSet::default();
        set.add(Category::Artists, "Justice".to_string(), None).unwrap();
        set.add(Category::Albums, "Cross".to_string(), None).unwrap();

        assert_eq!(set.list(Category::Artists).len(), 1);
        assert_eq!(set.list(Category::Albums).len(), 1);
        assert!(set.list(Category::Songs).is_empty());
    }
}
