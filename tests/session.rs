use std::sync::Arc;

use vibesocial::events::{AppEvent, EventBus};
use vibesocial::models::{LoginData, Profile, ProfileUpdate};
use vibesocial::session::{
    placeholder_avatar, SessionStore, AUTH_FLAG_KEY, DEFAULT_DISPLAY_NAME, DIRECTORY_KEY, SESSION_KEY,
};
use vibesocial::store::{FileStore, KeyValueStore, MemoryStore};

fn login_as(id: &str) -> LoginData {
    LoginData { id: id.into(), ..LoginData::default() }
}

#[test]
fn login_fills_defaults_and_persists() {
    let store = Arc::new(MemoryStore::new());
    let mut s = SessionStore::hydrate(store.clone());
    assert!(!s.is_authenticated());

    let p = s.login(login_as("clerk_ada")).unwrap();
    assert_eq!(p.avatar, placeholder_avatar("clerk_ada"));
    assert_eq!(p.name, DEFAULT_DISPLAY_NAME);
    assert!(p.following.is_empty());
    assert_eq!(store.get(AUTH_FLAG_KEY).as_deref(), Some("true"));

    let reloaded = SessionStore::hydrate(store);
    assert_eq!(reloaded.current().unwrap().id, "clerk_ada");
}

#[test]
fn logout_clears_session_for_next_load() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = SessionStore::hydrate(Arc::new(FileStore::open(dir.path())));
    s.login(LoginData {
        id: "clerk_ada".into(),
        name: Some("Ada".into()),
        email: Some("ada@example.com".into()),
        avatar: Some("ada.png".into()),
        following: Some(vec!["clerk_grace".into()]),
    })
    .unwrap();
    assert!(SessionStore::hydrate(Arc::new(FileStore::open(dir.path()))).is_authenticated());

    s.logout().unwrap();
    assert!(!s.is_authenticated());
    let fresh = FileStore::open(dir.path());
    assert!(fresh.get(AUTH_FLAG_KEY).is_none());
    assert!(!SessionStore::hydrate(Arc::new(fresh)).is_authenticated());
}

#[test]
fn blobs_without_id_or_garbage_are_no_session() {
    let store = Arc::new(MemoryStore::new());
    store.set(SESSION_KEY, r#"{"name":"nobody"}"#).unwrap();
    assert!(!SessionStore::hydrate(store.clone()).is_authenticated());
    store.set(SESSION_KEY, "{{{").unwrap();
    assert!(!SessionStore::hydrate(store).is_authenticated());
}

#[tokio::test]
async fn other_tab_picks_up_login_and_logout() {
    let bus = EventBus::default();
    let mut rx = bus.subscribe();
    let shared = MemoryStore::new().with_events(bus);
    let mut tab_a = SessionStore::hydrate(Arc::new(shared.clone()));
    let mut tab_b = SessionStore::hydrate(Arc::new(shared));

    tab_a.login(login_as("clerk_ada")).unwrap();
    tab_a.logout().unwrap();

    let mut seen_login = false;
    while let Ok(ev) = rx.try_recv() {
        if let AppEvent::Storage { key, new_value } = ev {
            tab_b.handle_storage_event(&key, new_value.as_deref());
            if tab_b.is_authenticated() {
                seen_login = true;
                assert_eq!(tab_b.current().unwrap().id, "clerk_ada");
            }
        }
    }
    assert!(seen_login);
    assert!(!tab_b.is_authenticated());
}

#[test]
fn unrelated_keys_do_not_touch_session() {
    let store = Arc::new(MemoryStore::new());
    let mut s = SessionStore::hydrate(store);
    s.login(login_as("clerk_ada")).unwrap();
    s.handle_storage_event(DIRECTORY_KEY, None);
    assert!(s.is_authenticated());
}

#[test]
fn update_user_syncs_directory_entry_only_if_present() {
    let store = Arc::new(MemoryStore::new());
    let mut s = SessionStore::hydrate(store);
    let me = s.login(login_as("me")).unwrap();
    let other = Profile { id: "other".into(), name: "Other".into(), ..Profile::default() };
    s.register_in_directory(&other).unwrap();

    // not in the directory yet: session changes, directory does not
    s.update_profile(ProfileUpdate { bio: Some("hi".into()), ..ProfileUpdate::default() }).unwrap();
    assert_eq!(s.current().unwrap().bio, "hi");
    assert_eq!(s.directory().len(), 1);

    s.register_in_directory(&me).unwrap();
    let updated = s
        .update_profile(ProfileUpdate { name: Some("Me Myself".into()), location: Some("Paris".into()), ..ProfileUpdate::default() })
        .unwrap()
        .unwrap();
    assert_eq!(updated.location.as_deref(), Some("Paris"));
    let dir = s.directory();
    let entry = dir.iter().find(|u| u.id == "me").unwrap();
    assert_eq!(entry.name, "Me Myself");
}

#[test]
fn follow_toggles_and_feeds_follower_lists() {
    let store = Arc::new(MemoryStore::new());
    let mut s = SessionStore::hydrate(store);
    let me = s.login(login_as("me")).unwrap();
    s.register_in_directory(&me).unwrap();
    let grace = Profile { id: "grace".into(), following: vec!["me".into()], ..Profile::default() };
    s.register_in_directory(&grace).unwrap();

    s.toggle_follow("grace").unwrap();
    let me_now = s.current().unwrap().clone();
    assert!(me_now.is_following("grace"));
    assert_eq!(s.following_of(&me_now).len(), 1);
    assert_eq!(s.followers_of("me")[0].id, "grace");

    s.toggle_follow("grace").unwrap();
    assert!(s.current().unwrap().following.is_empty());
}

#[test]
fn follow_without_session_is_noop() {
    let mut s = SessionStore::hydrate(Arc::new(MemoryStore::new()));
    s.toggle_follow("anyone").unwrap();
    assert!(s.update_profile(ProfileUpdate::default()).unwrap().is_none());
}

#[test]
fn last_search_is_remembered() {
    let store = Arc::new(MemoryStore::new());
    let s = SessionStore::hydrate(store.clone());
    assert_eq!(s.last_search(), "");
    s.save_search("beach").unwrap();
    assert_eq!(store.get("vibesocial_search_filter").as_deref(), Some("beach"));
    assert_eq!(SessionStore::hydrate(store).last_search(), "beach");
}
