//! Terminal-side application state: which pane has the keyboard, which row
//! is selected, and how keys map onto presenter intents.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use todo_core::{ApiError, Effects, FilterMode, Focus, HttpResponse, NoticeId, Presenter, RequestId, Snapshot};
use tracing::{debug, info};

/// Where keystrokes go when no inline edit is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pane {
    #[default]
    Input,
    List,
}

/// Everything `ui::draw` needs for one frame.
#[derive(Debug)]
pub struct Screen {
    pub snapshot: Snapshot,
    pub pane: Pane,
    pub selected: Option<usize>,
    pub editing: bool,
}

pub struct App {
    presenter: Presenter,
    pane: Pane,
    selected: usize,
    seen_focus_epoch: u64,
    should_quit: bool,
}

impl App {
    pub fn new(presenter: Presenter) -> Self {
        let seen_focus_epoch = presenter.focus_epoch();
        Self {
            presenter,
            pane: Pane::Input,
            selected: 0,
            seen_focus_epoch,
            should_quit: false,
        }
    }

    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    pub fn pane(&self) -> Pane {
        self.pane
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn start(&mut self) -> Effects {
        info!(filter = %self.presenter.filter(), "loading todos");
        self.presenter.start()
    }

    pub fn screen(&self) -> Screen {
        let snapshot = self.presenter.snapshot();
        let selected = (self.pane == Pane::List && !snapshot.items.is_empty()).then_some(self.selected);
        Screen {
            snapshot,
            pane: self.pane,
            selected,
            editing: self.is_editing(),
        }
    }

    pub fn handle_settled(&mut self, ticket: RequestId, outcome: Result<HttpResponse, ApiError>) {
        let settlement = self.presenter.settle(ticket, outcome);
        debug!(?ticket, ?settlement, "settled");
        self.after_transition();
    }

    pub fn handle_expire(&mut self, notice: NoticeId) {
        self.presenter.expire_error(notice);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Effects {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => self.should_quit = true,
                KeyCode::Char('x') => self.presenter.dismiss_error(),
                _ => {}
            }
            return Effects::default();
        }

        let effects = if self.is_editing() {
            self.edit_key(key)
        } else {
            match self.pane {
                Pane::Input => self.input_key(key),
                Pane::List => self.list_key(key),
            }
        };
        self.after_transition();
        effects
    }

    fn is_editing(&self) -> bool {
        self.presenter.edit_session().is_some()
    }

    fn input_key(&mut self, key: KeyEvent) -> Effects {
        match key.code {
            KeyCode::Enter => return self.presenter.submit_draft(),
            KeyCode::Char(c) => {
                let mut draft = self.presenter.draft().to_string();
                draft.push(c);
                self.presenter.set_draft(draft);
            }
            KeyCode::Backspace => {
                let mut draft = self.presenter.draft().to_string();
                draft.pop();
                self.presenter.set_draft(draft);
            }
            KeyCode::Tab | KeyCode::Down => self.pane = Pane::List,
            _ => {}
        }
        Effects::default()
    }

    fn list_key(&mut self, key: KeyEvent) -> Effects {
        let selected_id = self.selected_id();
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.selected += 1,
            KeyCode::Char(' ') => {
                if let Some(id) = selected_id {
                    return self.presenter.toggle(id);
                }
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(id) = selected_id {
                    self.presenter.begin_edit(id);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = selected_id {
                    return self.presenter.delete(id);
                }
            }
            KeyCode::Char('a') => return self.presenter.toggle_all(),
            KeyCode::Char('c') => return self.presenter.clear_completed(),
            KeyCode::Char('1') => self.presenter.set_filter(FilterMode::All),
            KeyCode::Char('2') => self.presenter.set_filter(FilterMode::Active),
            KeyCode::Char('3') => self.presenter.set_filter(FilterMode::Completed),
            KeyCode::Char('r') => return self.presenter.start(),
            KeyCode::Char('i') | KeyCode::Tab => self.pane = Pane::Input,
            _ => {}
        }
        Effects::default()
    }

    fn edit_key(&mut self, key: KeyEvent) -> Effects {
        let Some(draft) = self.presenter.edit_session().map(|s| s.draft().to_string()) else {
            return Effects::default();
        };
        match key.code {
            KeyCode::Enter | KeyCode::Tab => return self.presenter.commit_edit(),
            KeyCode::Esc => self.presenter.cancel_edit(),
            KeyCode::Char(c) => {
                let mut draft = draft;
                draft.push(c);
                self.presenter.set_edit_draft(draft);
            }
            KeyCode::Backspace => {
                let mut draft = draft;
                draft.pop();
                self.presenter.set_edit_draft(draft);
            }
            _ => {}
        }
        Effects::default()
    }

    fn selected_id(&self) -> Option<i64> {
        self.presenter.visible_ids().get(self.selected).copied()
    }

    /// Clamp the selection and follow any focus request from the presenter.
    fn after_transition(&mut self) {
        let visible = self.presenter.visible_ids().len();
        self.selected = self.selected.min(visible.saturating_sub(1));

        let epoch = self.presenter.focus_epoch();
        if epoch != self.seen_focus_epoch {
            self.seen_focus_epoch = epoch;
            match self.presenter.focus() {
                Focus::NewTodo => self.pane = Pane::Input,
                Focus::EditField(id) => {
                    self.pane = Pane::List;
                    if let Some(index) = self.presenter.visible_ids().iter().position(|v| *v == id) {
                        self.selected = index;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_core::{HttpMethod, TodoClient, TodoStore};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ok(body: &str) -> Result<HttpResponse, ApiError> {
        Ok(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
        })
    }

    fn loaded_app() -> App {
        let store = TodoStore::new(TodoClient::new("http://api.test", 907));
        let mut app = App::new(Presenter::new(store, FilterMode::All));
        let effects = app.start();
        app.handle_settled(
            effects.requests[0].ticket,
            ok(r#"[{"id":1,"userId":907,"title":"A","completed":false},
                   {"id":2,"userId":907,"title":"B","completed":true}]"#),
        );
        app
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn typing_and_enter_submits_a_create() {
        let mut app = loaded_app();
        assert_eq!(app.pane(), Pane::Input);
        type_text(&mut app, "Buy milk");
        let effects = app.handle_key(key(KeyCode::Enter));
        assert_eq!(effects.requests.len(), 1);
        assert_eq!(effects.requests[0].request.method, HttpMethod::Post);
        assert!(app.screen().snapshot.placeholder.is_some());
    }

    #[test]
    fn q_in_input_is_text_but_quits_in_list() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Char('q')));
        assert!(!app.should_quit());
        assert_eq!(app.presenter().draft(), "q");

        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit());
    }

    #[test]
    fn space_toggles_selected_row() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.selected(), 1);
        let effects = app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(effects.requests[0].request.path, "http://api.test/todos/2");
    }

    #[test]
    fn selection_is_clamped_to_visible_rows() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Tab));
        for _ in 0..5 {
            app.handle_key(key(KeyCode::Down));
        }
        assert_eq!(app.selected(), 1);
        app.handle_key(key(KeyCode::Char('2')));
        assert_eq!(app.selected(), 0);
        assert_eq!(app.screen().snapshot.items.len(), 1);
    }

    #[test]
    fn edit_then_escape_returns_to_input() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Enter));
        assert!(app.screen().editing);
        type_text(&mut app, "xyz");
        app.handle_key(key(KeyCode::Esc));
        let screen = app.screen();
        assert!(!screen.editing);
        assert_eq!(screen.pane, Pane::Input);
        assert_eq!(screen.snapshot.items[0].title, "A");
    }

    #[test]
    fn clearing_edit_draft_sends_delete() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Char('e')));
        app.handle_key(key(KeyCode::Backspace));
        let effects = app.handle_key(key(KeyCode::Enter));
        assert_eq!(effects.requests[0].request.method, HttpMethod::Delete);

        app.handle_settled(
            effects.requests[0].ticket,
            Ok(HttpResponse {
                status: 204,
                headers: Vec::new(),
                body: String::new(),
            }),
        );
        assert_eq!(app.pane(), Pane::Input);
        assert_eq!(app.presenter().visible_ids(), vec![2]);
    }

    #[test]
    fn ctrl_x_dismisses_error() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Enter));
        assert!(app.screen().snapshot.error_text.is_some());
        app.handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL));
        assert!(app.screen().snapshot.error_text.is_none());
    }
}
