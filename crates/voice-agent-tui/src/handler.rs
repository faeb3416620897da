use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use voice_agent_core::AgentBackend;
use crate::app::App;
use crate::tui::AppEvent;

pub async fn handle_event<B: AgentBackend + 'static>(app: &mut App<B>, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }

    // Every event doubles as a chance to pick up a finished turn
    app.poll_turn().await;
    app.sync_transcript();
    Ok(())
}

fn handle_key<B: AgentBackend + 'static>(app: &mut App<B>, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),

        // The mic control; ignored by the controller while a turn is in flight
        KeyCode::Char(' ') | KeyCode::Enter => app.trigger_turn(),

        // Half-page scroll
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_down();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_up();
        }

        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::PageDown => app.scroll_half_page_down(),
        KeyCode::PageUp => app.scroll_half_page_up(),
        KeyCode::Char('g') | KeyCode::Home => app.scroll_to_top(),
        KeyCode::Char('G') | KeyCode::End => app.scroll_to_bottom(),

        _ => {}
    }
}

fn handle_mouse<B: AgentBackend + 'static>(app: &mut App<B>, mouse: MouseEvent) {
    let in_chat = is_inside(app.chat_area, mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::ScrollDown if in_chat => app.scroll_down(3),
        MouseEventKind::ScrollUp if in_chat => app.scroll_up(3),
        MouseEventKind::Down(MouseButton::Left) => {
            if is_inside(app.mic_area, mouse.column, mouse.row) {
                app.trigger_turn();
            }
        }
        _ => {}
    }
}

fn is_inside(area: Option<Rect>, column: u16, row: u16) -> bool {
    area.is_some_and(|a| {
        column >= a.x && column < a.x + a.width && row >= a.y && row < a.y + a.height
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crossterm::event::KeyEventState;
    use voice_agent_core::{AgentReply, AgentResult};

    struct Idle;

    #[async_trait]
    impl AgentBackend for Idle {
        async fn run_agent(&self) -> AgentResult<AgentReply> {
            std::future::pending().await
        }
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers,
            kind: crossterm::event::KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn click(column: u16, row: u16) -> AppEvent {
        AppEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[tokio::test]
    async fn test_space_starts_turn_once() {
        let mut app = App::new(Idle, "127.0.0.1:8000");

        handle_event(&mut app, key(KeyCode::Char(' '), KeyModifiers::NONE)).await.unwrap();
        assert!(app.is_listening());

        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::NONE)).await.unwrap();
        assert!(app.is_listening());
        assert_eq!(app.controller.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_ctrl_c_quits() {
        let mut app = App::new(Idle, "127.0.0.1:8000");

        handle_event(&mut app, key(KeyCode::Char('c'), KeyModifiers::CONTROL)).await.unwrap();

        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_click_on_mic_starts_turn() {
        let mut app = App::new(Idle, "127.0.0.1:8000");
        app.mic_area = Some(Rect::new(0, 20, 80, 3));

        handle_event(&mut app, click(5, 5)).await.unwrap();
        assert!(!app.is_listening());

        handle_event(&mut app, click(40, 21)).await.unwrap();
        assert!(app.is_listening());
    }

    #[test]
    fn test_is_inside_bounds() {
        let area = Some(Rect::new(2, 3, 4, 2));
        assert!(is_inside(area, 2, 3));
        assert!(is_inside(area, 5, 4));
        assert!(!is_inside(area, 6, 4));
        assert!(!is_inside(area, 2, 5));
        assert!(!is_inside(None, 0, 0));
    }
}
