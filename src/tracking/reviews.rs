use super::error::{TrackingError, TrackingResult};
use super::ratings::mean;
use crate::catalog_store::ContentRef;
use crate::user::FullUserStore;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// One user's rating and note on a single node.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Review {
    pub user_id: i64,
    pub user_handle: String,
    pub rating: Option<f64>,
    pub note: Option<String>,
}

pub struct ReviewCollator {
    users: Arc<dyn FullUserStore>,
}

impl ReviewCollator {
    pub fn new(users: Arc<dyn FullUserStore>) -> Self {
        Self { users }
    }

    /// Annotations left directly on `target`, one record per user.
    pub fn reviews_for(&self, target: ContentRef) -> TrackingResult<Vec<Review>> {
        let mut reviews: Vec<Review> = Vec::new();
        let mut by_user: HashMap<i64, usize> = HashMap::new();

        for rating in self.users.get_ratings_for(target)? {
            let index = self.review_index(&mut reviews, &mut by_user, rating.user_id)?;
            reviews[index].rating = Some(rating.value);
        }
        for note in self.users.get_notes_for(target)? {
            let index = self.review_index(&mut reviews, &mut by_user, note.user_id)?;
            reviews[index].note = Some(note.content);
        }
        Ok(reviews)
    }

    /// Flat mean of the ratings left directly on `target`.
    pub fn average_rating(&self, target: ContentRef) -> TrackingResult<Option<f64>> {
        Ok(mean(
            self.users
                .get_ratings_for(target)?
                .into_iter()
                .map(|r| r.value),
        ))
    }

    fn review_index(
        &self,
        reviews: &mut Vec<Review>,
        by_user: &mut HashMap<i64, usize>,
        user_id: i64,
    ) -> TrackingResult<usize> {
        if let Some(index) = by_user.get(&user_id) {
            return Ok(*index);
        }
        let user_handle = self
            .users
            .get_user_handle(user_id)?
            .ok_or(TrackingError::UnknownUser(user_id))?;
        reviews.push(Review {
            user_id,
            user_handle,
            rating: None,
            note: None,
        });
        by_user.insert(user_id, reviews.len() - 1);
        Ok(reviews.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::test_fixtures::CatalogFixture;

    #[test]
    fn merges_rating_and_note_per_user() {
        let fixture = CatalogFixture::new();
        let alice = fixture.user("alice");
        let bob = fixture.user("bob");
        let carol = fixture.user("carol");
        let movie = ContentRef::Movie(fixture.movie("Alien", None));

        fixture.rate(alice, movie, 9.0);
        fixture.note(alice, movie, "tense");
        fixture.note(bob, movie, "too dark");
        fixture.rate(carol, movie, 6.0);

        let mut reviews = ReviewCollator::new(fixture.users())
            .reviews_for(movie)
            .unwrap();
        reviews.sort_by_key(|r| r.user_id);

        assert_eq!(
            reviews,
            vec![
                Review {
                    user_id: alice,
                    user_handle: "alice".to_string(),
                    rating: Some(9.0),
                    note: Some("tense".to_string()),
                },
                Review {
                    user_id: bob,
                    user_handle: "bob".to_string(),
                    rating: None,
                    note: Some("too dark".to_string()),
                },
                Review {
                    user_id: carol,
                    user_handle: "carol".to_string(),
                    rating: Some(6.0),
                    note: None,
                },
            ]
        );
    }

    #[test]
    fn only_direct_annotations_count() {
        let fixture = CatalogFixture::new();
        let alice = fixture.user("alice");
        let show = fixture.show("Fleabag", None);
        let season = fixture.season(show, 1);
        let episodes = fixture.episodes(season, 1);
        fixture.rate(alice, ContentRef::Episode(episodes[0]), 10.0);
        fixture.note(alice, ContentRef::Episode(episodes[0]), "wow");

        let collator = ReviewCollator::new(fixture.users());
        assert!(collator
            .reviews_for(ContentRef::Season(season))
            .unwrap()
            .is_empty());
        assert_eq!(
            collator.average_rating(ContentRef::Season(season)).unwrap(),
            None
        );
    }

    #[test]
    fn average_rating_is_flat_over_direct_ratings() {
        let fixture = CatalogFixture::new();
        let show = ContentRef::Show(fixture.show("Fleabag", None));
        for (handle, value) in [("a", 4.0), ("b", 5.0), ("c", 9.0)] {
            let user = fixture.user(handle);
            fixture.rate(user, show, value);
        }

        assert_eq!(
            ReviewCollator::new(fixture.users())
                .average_rating(show)
                .unwrap(),
            Some(6.0)
        );
    }
}
