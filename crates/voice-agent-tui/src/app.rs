use ratatui::layout::Rect;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use voice_agent_core::{
    AgentBackend, AgentClient, AgentReply, AgentResult, TranscriptController, TranscriptEvent,
};

pub struct App<B = AgentClient> {
    // Core state
    pub should_quit: bool,
    pub controller: TranscriptController<B>,
    pub transcript_events: mpsc::UnboundedReceiver<TranscriptEvent>,
    pub turn_task: Option<JoinHandle<AgentResult<AgentReply>>>,
    pub host_label: String,

    // Transcript scroll state (max_scroll and chat_height are updated during render)
    pub chat_scroll: u16,
    pub max_scroll: u16,
    pub chat_height: u16,
    pub follow_tail: bool,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub mic_area: Option<Rect>,
}

impl<B: AgentBackend + 'static> App<B> {
    pub fn new(backend: B, host_label: impl Into<String>) -> Self {
        let mut controller = TranscriptController::new(backend);
        let transcript_events = controller.subscribe();

        Self {
            should_quit: false,
            controller,
            transcript_events,
            turn_task: None,
            host_label: host_label.into(),

            chat_scroll: 0,
            max_scroll: 0,
            chat_height: 0,
            follow_tail: true,

            animation_frame: 0,

            chat_area: None,
            mic_area: None,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.controller.is_busy()
    }

    /// Start a turn unless one is already in flight
    pub fn trigger_turn(&mut self) {
        if let Some(task) = self.controller.spawn_turn() {
            self.animation_frame = 0;
            self.turn_task = Some(task);
        }
    }

    /// Settle the turn in flight once its task has finished
    pub async fn poll_turn(&mut self) {
        let finished = self
            .turn_task
            .as_ref()
            .is_some_and(|task| task.is_finished());

        if finished {
            if let Some(task) = self.turn_task.take() {
                self.controller.settle(task).await;
            }
        }
    }

    /// React to controller notifications: new entries pull the view to the bottom
    pub fn sync_transcript(&mut self) {
        while let Ok(event) = self.transcript_events.try_recv() {
            match event {
                TranscriptEvent::EntryAppended(_) => self.scroll_to_bottom(),
                TranscriptEvent::BusyChanged(false) => self.animation_frame = 0,
                TranscriptEvent::BusyChanged(true) => {}
            }
        }
    }

    pub fn quit(&mut self) {
        // The backend keeps recording on its side; we just stop waiting.
        if let Some(task) = self.turn_task.take() {
            task.abort();
        }
        self.should_quit = true;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_listening() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_tail = false;
        self.chat_scroll = self.chat_scroll.min(self.max_scroll).saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.max_scroll);
        if self.chat_scroll >= self.max_scroll {
            self.follow_tail = true;
        }
    }

    pub fn scroll_half_page_up(&mut self) {
        self.scroll_up((self.chat_height / 2).max(1));
    }

    pub fn scroll_half_page_down(&mut self) {
        self.scroll_down((self.chat_height / 2).max(1));
    }

    pub fn scroll_to_top(&mut self) {
        self.follow_tail = false;
        self.chat_scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow_tail = true;
        self.chat_scroll = self.max_scroll;
    }

    /// Record the transcript geometry from the last render and pin to the
    /// bottom if we are following new entries
    pub fn update_scroll_bounds(&mut self, total_lines: usize, height: u16) {
        self.chat_height = height;
        self.max_scroll = u16::try_from(total_lines)
            .unwrap_or(u16::MAX)
            .saturating_sub(height);
        if self.follow_tail {
            self.chat_scroll = self.max_scroll;
        } else {
            self.chat_scroll = self.chat_scroll.min(self.max_scroll);
        }
    }
}
