//! Terminal driver: renders the current step on stderr and feeds stdin
//! lines to the wizard as events.

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::attribution::LandingContext;
use crate::config::FunnelConfig;
use crate::questionnaire::options::labels_for;
use crate::questionnaire::{AnswerSet, MultiAnswer, Question, SingleAnswer, Step, TextField};
use crate::wizard::WizardController;

/// One line of user input, interpreted against the current step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 1-based option number.
    Pick(usize),
    /// Free text for the step's input field(s).
    Text(String),
    /// Elaboration for "Other (specify below)".
    Other(String),
    Next,
    Back,
    Reset,
    StartOver,
    Help,
    Quit,
}

/// Interpret one input line for `step`. `None` for blank lines.
pub fn parse_command(step: Step, line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let command = match line {
        "/next" | "/n" => Command::Next,
        "/back" | "/b" => Command::Back,
        "/reset" => Command::Reset,
        "/restart" => Command::StartOver,
        "/help" | "/?" => Command::Help,
        "/quit" | "/q" => Command::Quit,
        _ => {
            if let Some(text) = line.strip_prefix("/other ") {
                return Some(Command::Other(text.trim().to_string()));
            }
            match (step.question(), line.parse::<usize>()) {
                (Some(_), Ok(n)) => Command::Pick(n),
                _ => Command::Text(line.to_string()),
            }
        }
    };
    Some(command)
}

/// The prompt, options and current selection for a step.
pub fn render_step(step: Step, answers: &AnswerSet) -> String {
    let mut out = format!("\nStep {} of {}: {}\n", step.index(), Step::LAST.index(), step.prompt());

    match step.question() {
        Some(question) => {
            let selected = selected_labels(question, answers);
            for (i, label) in labels_for(question).iter().enumerate() {
                let mark = if selected.contains(label) { "x" } else { " " };
                out.push_str(&format!("  [{mark}] {}. {label}\n", i + 1));
            }
            if question.is_multi_select() {
                out.push_str("  (toggle with a number, /next to continue)\n");
            }
            if question == Question::SupportNeeded && !answers.other_support_needed.is_empty() {
                out.push_str(&format!("  Other: {}\n", answers.other_support_needed));
            }
        }
        None => {
            let current = step.answer_summary(answers);
            if !current.is_empty() {
                out.push_str(&format!("  current: {current} (/next to keep)\n"));
            }
        }
    }
    out
}

fn selected_labels(question: Question, answers: &AnswerSet) -> Vec<&'static str> {
    if question.is_multi_select() {
        answers.multi_labels(question)
    } else {
        answers.single(question).map(|a| a.label()).into_iter().collect()
    }
}

/// What the loop should do after a command.
enum Flow {
    Continue,
    Exit,
}

async fn apply(wizard: &mut WizardController, step: Step, command: Command) -> Flow {
    match command {
        Command::Quit => return Flow::Exit,
        Command::Help => eprintln!("{}", HELP),
        Command::Next if step == Step::LAST => submit(wizard).await,
        Command::Next => {
            wizard.advance().await;
            if wizard.current_step() == Some(step) {
                eprintln!("Please complete this step before continuing.");
            }
        }
        Command::Back => wizard.retreat().await,
        Command::Reset => {
            wizard.reset_and_continue();
            eprintln!("Form reset.");
        }
        Command::StartOver => {
            wizard.start_over();
        }
        Command::Pick(n) => pick(wizard, step, n).await,
        Command::Other(text) => {
            wizard.set_text(TextField::OtherSupportNeeded, text).await;
        }
        Command::Text(text) => {
            if enter_text(wizard, step, text).await {
                if step == Step::LAST {
                    submit(wizard).await;
                } else {
                    wizard.advance().await;
                }
            }
        }
    }
    Flow::Continue
}

async fn pick(wizard: &mut WizardController, step: Step, n: usize) {
    let Some(question) = step.question() else {
        return;
    };
    let Some(label) = n.checked_sub(1).and_then(|i| labels_for(question).get(i).copied()) else {
        eprintln!("No option {n}.");
        return;
    };
    if question.is_multi_select() {
        if let Some(answer) = MultiAnswer::parse(question, label) {
            wizard.toggle_multi(answer).await;
        }
    } else if let Some(answer) = SingleAnswer::parse(question, label) {
        wizard.select_single(answer).await;
    }
}

/// Returns whether the text was accepted for the step.
async fn enter_text(wizard: &mut WizardController, step: Step, text: String) -> bool {
    match step {
        Step::FullName => {
            let (first, last) = crate::submission::split_full_name(&text);
            wizard.set_text(TextField::FirstName, first).await;
            wizard.set_text(TextField::LastName, last).await;
        }
        Step::Email => wizard.set_text(TextField::Email, text).await,
        Step::Phone => wizard.set_text(TextField::Phone, text).await,
        Step::SupportNeeded => wizard.set_text(TextField::OtherSupportNeeded, text).await,
        _ => {
            eprintln!("Pick an option by number.");
            return false;
        }
    }
    true
}

async fn submit(wizard: &mut WizardController) {
    eprintln!("Submitting...");
    if let Err(e) = wizard.submit().await {
        eprintln!("Form Submission Error: {e}");
    }
}

const HELP: &str = "\
Commands:
  <number>        pick / toggle an option
  <text>          answer a name, email or phone step
  /other <text>   describe \"Other\" support needs
  /next, /back    move between steps
  /reset          clear saved answers and start at step 1
  /restart        leave for the funnel entry page
  /quit           exit (answers stay saved)";

/// Landing context for a terminal session, from `FUNNEL_QUERY`,
/// `FUNNEL_REFERRER` and `FUNNEL_COOKIES`.
pub fn landing_context_from_env(config: &FunnelConfig) -> LandingContext {
    let page_url = match std::env::var("FUNNEL_QUERY") {
        Ok(query) if !query.trim().is_empty() => {
            format!("{}?{}", config.site_url, query.trim().trim_start_matches('?'))
        }
        _ => config.site_url.clone(),
    };
    let mut ctx = LandingContext::from_page_url(&page_url)
        .with_user_agent(format!("apply-funnel-cli/{}", env!("CARGO_PKG_VERSION")));
    if let Ok(referrer) = std::env::var("FUNNEL_REFERRER") {
        ctx = ctx.with_referrer(referrer);
    }
    if let Ok(cookies) = std::env::var("FUNNEL_COOKIES") {
        ctx = ctx.with_cookies(cookies);
    }
    ctx
}

/// Drive the wizard from stdin until it redirects or the user quits.
/// Returns the redirect URL, if any.
pub async fn run(mut wizard: WizardController) -> anyhow::Result<Option<String>> {
    if wizard.recovery_banner() {
        eprintln!("Something went wrong loading your saved answers. /reset to continue, /restart to start over.");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_rendered = None;

    loop {
        if let Some(url) = wizard.redirect_url() {
            return Ok(Some(url));
        }
        let Some(step) = wizard.current_step() else {
            return Ok(None);
        };
        if last_rendered != Some(step) {
            eprint!("{}", render_step(step, wizard.answers()));
            last_rendered = Some(step);
        }
        eprint!("> ");

        let Some(line) = lines.next_line().await? else {
            return Ok(None);
        };
        let Some(command) = parse_command(step, &line) else {
            continue;
        };
        if let Flow::Exit = apply(&mut wizard, step, command).await {
            return Ok(None);
        }
        if wizard.current_step() == Some(step) && wizard.redirect().is_none() {
            // Re-render to show the updated selection.
            last_rendered = None;
        }
    }
}
