use std::sync::{Arc, Mutex, MutexGuard};

use knowledge_arena_bot::config::Config;
use knowledge_arena_bot::quiz::{
    AnswerReport, Battle, BattleSession, Catalog, Phase, Question, QuizError, RandomDraw,
    ScoreDraw,
};
use log::{debug, info};
use teloxide::{
    dispatching::dialogue::InMemStorage,
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup},
};

type ArenaDialogue = Dialogue<State, InMemStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
type SharedDraw = Arc<Mutex<RandomDraw>>;

#[derive(Clone, Default)]
pub enum State {
    #[default]
    Start,
    Battle(BattleSession),
}

#[tokio::main]
async fn main() {
    let config = Config::from_env().expect("Failed to load configuration");

    pretty_env_logger::init();
    info!("Starting Knowledge Arena bot...");

    let catalog = Arc::new(Catalog::bundled().expect("Bundled catalog is invalid"));
    check_buttons(&catalog).expect("Catalog clashes with bot commands");
    info!(
        "Catalog loaded: {} topics, {} opponents",
        catalog.list_topics().len(),
        catalog.list_opponents().len()
    );

    let draw = match config.rng_seed {
        Some(seed) => {
            info!("Opponent draws seeded with {}", seed);
            RandomDraw::seeded(seed)
        }
        None => RandomDraw::from_entropy(),
    };
    let draw: SharedDraw = Arc::new(Mutex::new(draw));

    let bot = Bot::new(config.bot_token);

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, InMemStorage<State>, State>()
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::Battle(session)].endpoint(battle_turn)),
    )
    .dependencies(dptree::deps![InMemStorage::<State>::new(), catalog, draw])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}

const GREETING_TEXT: &str = "Welcome to the Knowledge Arena! Pick a topic, challenge an opponent and see who knows more.";
const PLAY_AGAIN: &str = "Play again";
const START_COMMAND: &str = "/start";

fn is_command(text: &str) -> bool {
    text == START_COMMAND || text == PLAY_AGAIN
}

/// Every button label has to map back to exactly one action, so none may look like a command.
fn check_buttons(catalog: &Catalog) -> Result<(), QuizError> {
    let topics = catalog.list_topics().iter().map(|t| t.name.as_str());
    let opponents = catalog.list_opponents().iter().map(|o| o.name.as_str());
    let mut options = Vec::new();
    for topic in catalog.list_topics() {
        for question in catalog.questions_for(topic.id)? {
            options.extend(question.options.iter().map(String::as_str));
        }
    }

    match topics.chain(opponents).chain(options).find(|label| is_command(label)) {
        Some(label) => Err(QuizError::InvalidArgument(format!(
            "{:?} is reserved for a bot command",
            label
        ))),
        None => Ok(()),
    }
}

struct Reply {
    text: String,
    keyboard: Option<KeyboardMarkup>,
}

impl Reply {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    fn with_keyboard(text: impl Into<String>, keyboard: KeyboardMarkup) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

async fn send_replies(bot: &Bot, msg: &Message, replies: Vec<Reply>) -> HandlerResult {
    for reply in replies {
        let request = bot.send_message(msg.chat.id, reply.text);
        match reply.keyboard {
            Some(keyboard) => request.reply_markup(keyboard).await?,
            None => request.await?,
        };
    }
    Ok(())
}

fn lock(
    draw: &SharedDraw,
) -> Result<MutexGuard<'_, RandomDraw>, Box<dyn std::error::Error + Send + Sync>> {
    draw.lock()
        .map_err(|_| "opponent draw source is poisoned".into())
}

async fn start(
    bot: Bot,
    dialogue: ArenaDialogue,
    catalog: Arc<Catalog>,
    msg: Message,
) -> HandlerResult {
    let replies = vec![Reply::plain(GREETING_TEXT), topics_view(&catalog)];
    send_replies(&bot, &msg, replies).await?;

    dialogue.update(State::Battle(BattleSession::new())).await?;
    Ok(())
}

async fn battle_turn(
    bot: Bot,
    dialogue: ArenaDialogue,
    session: BattleSession,
    catalog: Arc<Catalog>,
    draw: SharedDraw,
    msg: Message,
) -> HandlerResult {
    let text = match msg.text() {
        Some(text) => text.to_string(),
        None => {
            bot.send_message(msg.chat.id, "Please use the buttons below")
                .await?;
            return Ok(());
        }
    };

    if is_command(&text) {
        return start(bot, dialogue, catalog, msg).await;
    }

    debug!(
        "Chat {} is {} at question {}",
        msg.chat.id.0,
        session.phase(),
        session.current_question_index() + 1
    );

    // The guard must be gone before the first await
    let (replies, session) = {
        let mut draw = lock(&draw)?;
        let mut battle = Battle::resume(catalog.clone(), session, &mut *draw);
        let replies = advance(&mut battle, &text)?;
        (replies, battle.into_session())
    };

    send_replies(&bot, &msg, replies).await?;
    dialogue.update(State::Battle(session)).await?;
    Ok(())
}

/// Applies the pressed button to the battle and renders what the user sees next.
fn advance<D: ScoreDraw>(battle: &mut Battle<D>, text: &str) -> Result<Vec<Reply>, QuizError> {
    match battle.session().phase() {
        Phase::ChoosingTopic => {
            let topic = match battle.catalog().topic_by_name(text) {
                Some(topic) => topic.clone(),
                None => return Ok(vec![Reply::plain("Please choose one of the topics")]),
            };
            battle.select_topic(&topic)?;
            Ok(vec![opponents_view(battle.catalog(), &topic.name)])
        }
        Phase::ChoosingOpponent => {
            let opponent = match battle.catalog().opponent_by_name(text) {
                Some(opponent) => opponent.clone(),
                None => return Ok(vec![Reply::plain("Please choose one of the opponents")]),
            };
            battle.select_opponent(&opponent)?;
            Ok(vec![
                Reply::plain(format!("Challenge sent! {} accepts the battle.", opponent.name)),
                question_view(battle)?,
            ])
        }
        Phase::Answering => {
            let question = battle.current_question()?.clone();
            let option_index = match question.option_index(text) {
                Some(index) => index,
                None => return Ok(vec![Reply::plain("Please choose one of the options")]),
            };
            let report = battle.submit_answer(option_index)?;

            let opponent_name = battle
                .session()
                .selected_opponent()
                .map(|o| o.name.clone())
                .unwrap_or_default();
            let mut replies = vec![Reply::plain(feedback_text(&question, &report, &opponent_name))];
            if report.finished {
                replies.push(result_view(battle.session())?);
            } else {
                replies.push(question_view(battle)?);
            }
            Ok(replies)
        }
        Phase::Finished => Ok(vec![result_view(battle.session())?]),
    }
}

fn topics_view(catalog: &Catalog) -> Reply {
    let mut text = String::from("Choose your battle ground:\n");
    for topic in catalog.list_topics() {
        text.push_str(&format!(
            "\n{} [{}, {}]\n{}\n",
            topic.name, topic.category, topic.difficulty, topic.description
        ));
    }

    let keyboard = KeyboardMarkup::new(
        catalog
            .list_topics()
            .iter()
            .map(|t| vec![KeyboardButton::new(t.name.clone())])
            .collect::<Vec<_>>(),
    );
    Reply::with_keyboard(text, keyboard)
}

fn opponents_view(catalog: &Catalog, topic_name: &str) -> Reply {
    let mut text = format!("{} it is! Choose your opponent:\n", topic_name);
    for opponent in catalog.list_opponents() {
        let presence = if opponent.is_online() { "online" } else { "offline" };
        text.push_str(&format!(
            "\n{} ({}) - {}% win rate\nSpecialties: {}\n",
            opponent.name,
            presence,
            opponent.win_rate_level,
            opponent.specialties.join(", ")
        ));
    }

    let keyboard = KeyboardMarkup::new(
        catalog
            .list_opponents()
            .iter()
            .map(|o| vec![KeyboardButton::new(o.name.clone())])
            .collect::<Vec<_>>(),
    );
    Reply::with_keyboard(text, keyboard)
}

fn question_view<D: ScoreDraw>(battle: &Battle<D>) -> Result<Reply, QuizError> {
    let question = battle.current_question()?;
    let (number, total) = battle.progress().ok_or(QuizError::InvalidTransition {
        action: "show progress",
        phase: battle.session().phase(),
    })?;

    let text = format!("Question {}/{}\n\n{}", number, total, question.prompt);
    let keyboard = KeyboardMarkup::new(
        question
            .options
            .iter()
            .map(|o| vec![KeyboardButton::new(o.clone())])
            .collect::<Vec<_>>(),
    );
    Ok(Reply::with_keyboard(text, keyboard))
}

fn feedback_text(question: &Question, report: &AnswerReport, opponent_name: &str) -> String {
    let verdict = if report.correct {
        "Correct!".to_string()
    } else {
        format!(
            "Wrong! The right answer is {}.",
            question.correct_option().unwrap_or_default()
        )
    };
    let opponent = if report.opponent_scored {
        format!("{} got it right.", opponent_name)
    } else {
        format!("{} missed this one.", opponent_name)
    };
    format!("{}\n{}\n\n{}", verdict, question.explanation, opponent)
}

fn result_view(session: &BattleSession) -> Result<Reply, QuizError> {
    let outcome = session.outcome()?;
    let score = session.score();
    let opponent_name = session
        .selected_opponent()
        .map(|o| o.name.as_str())
        .unwrap_or("Opponent");

    let text = format!(
        "Battle Results\n\nYou: {}\n{}: {}\nYou answered {} of {} questions correctly.\n\n{}\n{}",
        score.user,
        opponent_name,
        score.opponent,
        score.user,
        session.answers_given().len(),
        outcome.headline(),
        outcome.message()
    );
    let keyboard = KeyboardMarkup::new(vec![vec![KeyboardButton::new(PLAY_AGAIN)]]);
    Ok(Reply::with_keyboard(text, keyboard))
}
