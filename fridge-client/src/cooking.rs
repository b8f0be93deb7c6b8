//! Drives a [`CookingSequencer`]: fetches step pictures, narrates steps and
//! feeds the timer. Dropping the session cancels whatever is still in flight.
use crate::ingestion::{AiGateway, CacheTier, GenerativeModel, SpeechAudio};
use fridge::cooking::{CookingSequencer, StepEntry, Timer, TimerEvent};
use fridge::{Language, Recipe};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Results of background work, delivered back to the session.
#[derive(Debug)]
pub enum CookingEvent {
    Visual { index: usize, url: Option<String> },
    Narration(Option<SpeechAudio>),
}

pub struct CookingSession<M, C> {
    gateway: Arc<AiGateway<M, C>>,
    sequencer: CookingSequencer,
    language: Language,
    sender: mpsc::UnboundedSender<CookingEvent>,
    inbox: mpsc::UnboundedReceiver<CookingEvent>,
    tasks: JoinSet<()>,
}

impl<M, C> CookingSession<M, C>
where
    M: GenerativeModel + 'static,
    C: CacheTier + 'static,
{
    pub fn open(gateway: Arc<AiGateway<M, C>>, recipe: &Recipe, language: Language) -> Self {
        let (sender, inbox) = mpsc::unbounded_channel();
        let (sequencer, entry) = CookingSequencer::start(recipe);
        let mut session = Self {
            gateway,
            sequencer,
            language,
            sender,
            inbox,
            tasks: JoinSet::new(),
        };
        if let Some(entry) = entry {
            session.fetch_visual(entry);
        }
        session
    }

    /// Forget tasks that already finished so the set only holds live work.
    fn reap(&mut self) {
        while let Some(result) = self.tasks.try_join_next() {
            if let Err(e) = result {
                tracing::warn!("Cooking task failed: {}", e);
            }
        }
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    fn fetch_visual(&mut self, entry: StepEntry) {
        self.reap();
        let gateway = self.gateway.clone();
        let sender = self.sender.clone();
        self.tasks.spawn(async move {
            let url = gateway
                .generate_step_image(&entry.text, Some(&entry.step_id))
                .await;
            // The session may already be closed.
            let _ = sender.send(CookingEvent::Visual {
                index: entry.index,
                url,
            });
        });
    }

    pub fn sequencer(&self) -> &CookingSequencer {
        &self.sequencer
    }

    /// Move to the next step. Returns false on the last step.
    pub fn next(&mut self) -> bool {
        match self.sequencer.next() {
            Some(entry) => {
                self.fetch_visual(entry);
                true
            }
            None => false,
        }
    }

    /// Move to the previous step. Returns false on the first step.
    pub fn back(&mut self) -> bool {
        match self.sequencer.back() {
            Some(entry) => {
                self.fetch_visual(entry);
                true
            }
            None => false,
        }
    }

    pub fn toggle_timer(&mut self) -> Timer {
        self.sequencer.toggle_timer()
    }

    /// Call once per second.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        self.sequencer.tick()
    }

    /// Start narrating the current step. Returns false if a narration is already under way.
    pub fn listen(&mut self) -> bool {
        let Some(text) = self.sequencer.begin_reading() else {
            return false;
        };
        self.reap();
        let gateway = self.gateway.clone();
        let sender = self.sender.clone();
        let language = self.language;
        self.tasks.spawn(async move {
            let audio = gateway.speak_step(&text, language).await;
            let _ = sender.send(CookingEvent::Narration(audio));
        });
        true
    }

    /// Wait for the next background result.
    pub async fn next_event(&mut self) -> Option<CookingEvent> {
        self.inbox.recv().await
    }

    /// Fold a background result into the session. Returns narration audio ready to play.
    ///
    /// The reading slot stays taken until [`CookingSession::finish_reading`] is
    /// called after playback.
    pub fn handle(&mut self, event: CookingEvent) -> Option<SpeechAudio> {
        self.reap();
        match event {
            CookingEvent::Visual { index, url } => {
                if !self.sequencer.apply_visual(index, url) {
                    tracing::debug!("Dropping picture for step {} no longer shown", index);
                }
                None
            }
            CookingEvent::Narration(Some(audio)) => Some(audio),
            CookingEvent::Narration(None) => {
                self.sequencer.finish_reading();
                None
            }
        }
    }

    pub fn finish_reading(&mut self) {
        self.sequencer.finish_reading();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::ingestion::test_support::{inline_response, recipe};
    use crate::ingestion::{MockGenerativeModel, NoCache};
    use fridge::cooking::StepVisual;

    fn gateway(model: MockGenerativeModel) -> Arc<AiGateway<MockGenerativeModel, NoCache>> {
        Arc::new(AiGateway::new(model, NoCache, ModelConfig::default()))
    }

    #[tokio::test]
    async fn visuals_arrive_for_the_current_step() {
        let mut model = MockGenerativeModel::new();
        model
            .expect_generate_content()
            .returning(|_, _| Ok(inline_response("image/png", "STEP")));
        let dish = recipe("r1", "Soup", &["Chop", "Simmer 10 minutes"]);
        let mut session = CookingSession::open(gateway(model), &dish, Language::En);
        assert_eq!(session.sequencer().visual(), &StepVisual::Loading);

        let event = session.next_event().await.unwrap();
        assert!(session.handle(event).is_none());
        assert_eq!(
            session.sequencer().visual(),
            &StepVisual::Ready("data:image/png;base64,STEP".into())
        );

        assert!(session.next());
        assert!(!session.next());
        assert_eq!(session.sequencer().timer(), Timer::Paused { remaining: 600 });
    }

    #[tokio::test]
    async fn late_visual_for_a_left_step_is_dropped() {
        let mut model = MockGenerativeModel::new();
        model.expect_generate_content().returning(|_, request| {
            let prompt = request.contents[0].parts[0].text.clone().unwrap_or_default();
            Ok(inline_response("image/png", &prompt))
        });
        let dish = recipe("r1", "Soup", &["Chop", "Stir"]);
        let mut session = CookingSession::open(gateway(model), &dish, Language::En);
        session.next();

        for _ in 0..2 {
            let event = session.next_event().await.unwrap();
            session.handle(event);
        }
        assert_eq!(
            session.sequencer().visual(),
            &StepVisual::Ready("data:image/png;base64,Cooking tutorial photo: Stir".into())
        );
    }

    #[tokio::test]
    async fn narration_is_single_flight() {
        let mut model = MockGenerativeModel::new();
        model
            .expect_generate_content()
            .withf(|model, _| model == "gemini-2.5-flash-image")
            .returning(|_, _| Ok(inline_response("image/png", "IMG")));
        model
            .expect_generate_content()
            .withf(|model, _| model == "gemini-2.5-flash-preview-tts")
            .times(1)
            .returning(|_, _| Ok(inline_response("audio/L16;rate=24000", "AQA=")));
        let dish = recipe("r1", "Soup", &["Stir"]);
        let mut session = CookingSession::open(gateway(model), &dish, Language::Id);

        assert!(session.listen());
        assert!(!session.listen());
        let mut audio = None;
        while audio.is_none() {
            let event = session.next_event().await.unwrap();
            audio = session.handle(event);
        }
        assert_eq!(audio.unwrap().pcm, vec![1, 0]);
        assert!(session.sequencer().is_reading());
        session.finish_reading();
        assert!(!session.sequencer().is_reading());
    }

    #[tokio::test]
    async fn recipe_without_steps_does_nothing() {
        let mut model = MockGenerativeModel::new();
        model.expect_generate_content().never();
        let dish = recipe("r1", "Soup", &[]);
        let mut session = CookingSession::open(gateway(model), &dish, Language::En);
        assert!(!session.next());
        assert!(!session.back());
        assert!(!session.listen());
        assert_eq!(session.tick(), None);
    }

    #[tokio::test]
    async fn finished_tasks_do_not_pile_up() {
        let mut model = MockGenerativeModel::new();
        model
            .expect_generate_content()
            .returning(|_, _| Ok(inline_response("image/png", "IMG")));
        let steps = ["One", "Two", "Three", "Four"];
        let dish = recipe("r1", "Soup", &steps);
        let mut session = CookingSession::open(gateway(model), &dish, Language::En);

        for _ in 1..steps.len() {
            let event = session.next_event().await.unwrap();
            session.handle(event);
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            assert!(session.next());
            assert_eq!(session.pending_tasks(), 1);
        }
    }
}
