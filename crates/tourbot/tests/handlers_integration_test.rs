//! Integration tests for the Telegram handler tree using teloxide_tests
//!
//! The real `schema()` runs against a mock Bot API server, backed by a
//! temporary SQLite database and media directory.
//! Run with: cargo test -p tourbot --test handlers_integration_test

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serial_test::serial;
use teloxide_tests::{MockBot, MockCallbackQuery, MockMessagePhoto, MockMessageText, MockUser};
use tempfile::TempDir;

use tourbot::telegram::{schema, HandlerDeps};
use tourcore::content::{Excursion, ExcursionId, Point, PointId};
use tourcore::storage::{ExcursionStore, IncomingFile, MediaSource};
use tourcore::{create_pool, AppResult, Catalog, EditorController, LocalMediaStore, SqliteExcursionStore};

/// Serves the same bytes for every inbound file.
struct StaticMedia;

#[async_trait]
impl MediaSource for StaticMedia {
    async fn download(&self, _file: &IncomingFile) -> AppResult<Bytes> {
        Ok(Bytes::from_static(b"jpeg"))
    }
}

struct Fixture {
    deps: HandlerDeps,
    store: Arc<SqliteExcursionStore>,
    dir: TempDir,
}

impl Fixture {
    /// One draft excursion with a single point; `admins` may edit it.
    fn new(admins: Vec<i64>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("tours.sqlite");
        let pool = Arc::new(create_pool(db_path.to_str().unwrap()).unwrap());
        let store = Arc::new(SqliteExcursionStore::new(pool));

        let mut excursion = Excursion::new(ExcursionId(1));
        excursion.name = "Draft tour".to_string();
        excursion.points.push(Point::new(PointId(1), excursion.id));
        store.save(&excursion).unwrap();

        let controller = EditorController::new(
            Arc::new(Catalog::new(vec![excursion])),
            store.clone(),
            Arc::new(LocalMediaStore::new(dir.path().join("media"))),
            Arc::new(StaticMedia),
        )
        .with_idle_timeout(None);

        Self {
            deps: HandlerDeps::new(Arc::new(controller), admins),
            store,
            dir,
        }
    }

    fn controller(&self) -> &EditorController {
        &self.deps.controller
    }

    async fn excursion(&self) -> Excursion {
        self.controller().catalog().excursion(ExcursionId(1)).await.unwrap()
    }
}

/// What the bot sent back for one update.
struct Outcome {
    texts: Vec<String>,
    /// `(text, show_alert)` of every answered callback query
    answers: Vec<(Option<String>, Option<bool>)>,
}

/// Dispatches one update through a fresh mock bot; the bot (and its global
/// lock) is released before the next update.
macro_rules! deliver {
    ($fixture:expr, $update:expr) => {{
        let mut bot = MockBot::new($update, schema($fixture.deps.clone()));
        bot.dispatch().await;
        let responses = bot.get_responses();
        Outcome {
            texts: responses
                .sent_messages
                .iter()
                .filter_map(|m| m.text().map(str::to_string))
                .collect(),
            answers: responses
                .answered_callback_queries
                .iter()
                .map(|a| (a.text.clone(), a.show_alert))
                .collect(),
        }
    }};
}

async fn press(fixture: &Fixture, data: &str) -> Outcome {
    deliver!(fixture, MockCallbackQuery::new().data(data))
}

async fn say(fixture: &Fixture, text: &str) -> Outcome {
    deliver!(fixture, MockMessageText::new().text(text))
}

async fn send_photo(fixture: &Fixture) -> Outcome {
    deliver!(fixture, MockMessagePhoto::new())
}

/// Mock updates come from the default mock user.
fn user_id() -> i64 {
    MockUser::ID as i64
}

#[tokio::test]
#[serial]
async fn admin_edit_runs_from_button_to_saved_excursion() {
    let fixture = Fixture::new(vec![user_id()]);

    let outcome = press(&fixture, "ex:edit:1").await;
    assert!(!outcome.texts.is_empty(), "the first field prompt is sent");
    assert!(fixture.controller().is_active(user_id()).await);

    say(&fixture, "Old Town").await;
    press(&fixture, "fld:bool:yes").await;
    let outcome = say(&fixture, "90").await;

    assert!(outcome.texts.iter().any(|text| text.contains("🎉")), "{:?}", outcome.texts);
    assert!(!fixture.controller().is_active(user_id()).await);

    let excursion = fixture.excursion().await;
    assert_eq!(excursion.name, "Old Town");
    assert!(excursion.is_paid);
    assert_eq!(excursion.duration_minutes, 90);
    assert_eq!(fixture.store.load_all().unwrap(), vec![excursion]);
}

#[tokio::test]
#[serial]
async fn menu_navigation_mid_edit_drops_the_session() {
    let fixture = Fixture::new(vec![user_id()]);
    press(&fixture, "ex:edit:1").await;
    say(&fixture, "Renamed").await;

    let outcome = press(&fixture, "ex:list").await;
    assert!(!fixture.controller().is_active(user_id()).await);
    assert!(!outcome.texts.is_empty());

    // Field buttons of the abandoned prompt no longer do anything
    let outcome = press(&fixture, "fld:bool:yes").await;
    assert!(outcome.texts.is_empty(), "{:?}", outcome.texts);
    assert_eq!(outcome.answers.len(), 1);

    let outcome = say(&fixture, "90").await;
    assert!(outcome.texts.is_empty(), "{:?}", outcome.texts);

    assert_eq!(fixture.excursion().await.name, "Draft tour");
    assert_eq!(fixture.store.load_all().unwrap()[0].name, "Draft tour");
}

#[tokio::test]
#[serial]
async fn non_admin_cannot_use_admin_buttons_or_edit() {
    let fixture = Fixture::new(Vec::new());

    let outcome = press(&fixture, "ex:publish:1").await;
    assert_eq!(outcome.answers.len(), 1);
    let (text, show_alert) = &outcome.answers[0];
    assert!(text.is_some(), "access denial is explained");
    assert_eq!(*show_alert, Some(true));
    assert!(outcome.texts.is_empty());
    assert!(fixture.excursion().await.is_draft);

    press(&fixture, "ex:edit:1").await;
    assert!(!fixture.controller().is_active(user_id()).await);

    let outcome = say(&fixture, "New name").await;
    assert!(outcome.texts.is_empty());
    assert_eq!(fixture.excursion().await.name, "Draft tour");
}

#[tokio::test]
#[serial]
async fn photo_message_lands_in_the_album_field() {
    let fixture = Fixture::new(vec![user_id()]);
    press(&fixture, "pt:edit:1:1").await;
    // name, link, text, audio
    for _ in 0..4 {
        press(&fixture, "fld:skip").await;
    }

    let outcome = send_photo(&fixture).await;
    assert!(!outcome.texts.is_empty(), "the upload is acknowledged");

    press(&fixture, "fld:files:replace").await;
    // address, location photo, location link
    for _ in 0..3 {
        press(&fixture, "fld:skip").await;
    }

    let point = fixture.controller().catalog().point(ExcursionId(1), PointId(1)).await.unwrap();
    assert_eq!(point.content.photos.len(), 1);
    let stored = fixture.dir.path().join("media").join(point.content.photos[0].as_str());
    assert!(stored.exists(), "{} was not written", stored.display());
    assert!(!fixture.controller().is_active(user_id()).await);
}
