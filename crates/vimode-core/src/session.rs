//! Session: the modal state machine.
//!
//! A [`Session`] owns everything the interpreter remembers between keys:
//! the mode, the half-typed command, registers, the last search, options
//! and the visual anchor. The host buffer is borrowed for each key.
//!
//! ```text
//!            i a A I o O c            :  /  ?
//!   Insert ◀─────────────── Normal ───────────────▶ Command
//!     │          Esc          ▲ │ v V       Enter/Esc │
//!     └──────────────────────▶│ ▼                     │
//!                           Visual ◀──────────────────┘
//! ```
//!
//! Every command is one undo step. Commands that enter Insert mode leave
//! the step open, so the typed text and the command that started it undo
//! together when Escape closes it.

use std::mem;

use tracing::{debug, trace, warn};
use vimode_keys::{KeyCode, KeyEvent};

use crate::command::{self, CommandLine, ExCommand, Prompt};
use crate::edit::{self, Side};
use crate::error::Error;
use crate::grammar::{Action, Command, Context, Parse, Parser, Target};
use crate::host::{self, TextBuffer};
use crate::mode::{Mode, VisualKind};
use crate::motion::{Motion, MotionEnv};
use crate::operator::{Operator, OperatorContext};
use crate::options::{OptionError, Options};
use crate::position::{Position, Range, RangeKind, Region};
use crate::register::RegisterFile;
use crate::search::{self, Pattern, SearchDirection, SearchState};
use crate::table::{Direct, ModeSwitch};

/// What the host should do with a key after the session saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The session consumed the key.
    Handled,
    /// Insert mode: the host applies the key as typing.
    PassThrough,
}

/// Interpreter state between keys.
#[derive(Debug)]
pub struct Session {
    mode: Mode,
    parser: Parser,
    registers: RegisterFile,
    search: SearchState,
    /// The last search compiled with the current case options.
    pattern: Option<Pattern>,
    options: Options,
    /// Fixed end of the visual selection.
    anchor: Position,
    cmdline: Option<CommandLine>,
    /// Mode restored when the command line closes.
    return_mode: Mode,
    /// Cursor when the command line opened.
    origin: Position,
    /// Column kept across `j`/`k`.
    sticky_col: Option<usize>,
    message: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    #[must_use]
    pub fn with_options(options: Options) -> Self {
        Self {
            mode: Mode::Normal,
            parser: Parser::new(),
            registers: RegisterFile::new(),
            search: SearchState::new(),
            pattern: None,
            options,
            anchor: Position::ZERO,
            cmdline: None,
            return_mode: Mode::Normal,
            origin: Position::ZERO,
            sticky_col: None,
            message: None,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// The last status message (errors, `:set` output, shift counts).
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Keys of the command being typed.
    #[must_use]
    pub fn pending_keys(&self) -> &str {
        self.parser.pending_keys()
    }

    /// The open command line, in Command mode.
    #[must_use]
    pub const fn command_line(&self) -> Option<&CommandLine> {
        self.cmdline.as_ref()
    }

    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    #[must_use]
    pub const fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// The visual anchor, in Visual mode.
    #[must_use]
    pub const fn anchor(&self) -> Option<Position> {
        if self.mode.is_visual() { Some(self.anchor) } else { None }
    }

    /// Run a `:set` argument string.
    ///
    /// # Errors
    ///
    /// The first rejected argument.
    pub fn set_options(&mut self, args: &str) -> Result<Option<String>, OptionError> {
        let shown = self.options.apply(args);
        self.rearm_search();
        shown
    }

    // -- Dispatch -----------------------------------------------------------

    /// Interpret one key.
    pub fn handle_key<B: TextBuffer + ?Sized>(&mut self, buf: &mut B, key: KeyEvent) -> KeyOutcome {
        match self.mode {
            Mode::Insert if key.code != KeyCode::Escape => return KeyOutcome::PassThrough,
            Mode::Insert => self.leave_insert(buf),
            Mode::Command => self.command_line_key(buf, key),
            Mode::Normal | Mode::Visual(_) => self.command_key(buf, key),
        }
        KeyOutcome::Handled
    }

    fn set_mode(&mut self, mode: Mode) {
        if mode != self.mode {
            debug!(from = %self.mode, to = %mode, "mode");
            self.mode = mode;
        }
    }

    fn leave_insert<B: TextBuffer + ?Sized>(&mut self, buf: &mut B) {
        buf.end_edit();
        let cursor = host::clamp(buf, buf.cursor(), true);
        buf.set_cursor(cursor.with_col(cursor.col.saturating_sub(1)));
        self.set_mode(Mode::Normal);
        self.settle(buf);
    }

    /// Bring cursor and selection in line with the mode.
    fn settle<B: TextBuffer + ?Sized>(&self, buf: &mut B) {
        match self.mode {
            Mode::Normal => {
                let pos = host::clamp(buf, buf.cursor(), false);
                buf.set_cursor(pos);
            }
            Mode::Visual(_) => {
                let pos = host::clamp(buf, buf.cursor(), true);
                buf.set_cursor(pos);
                let range = self.selection(buf).resolve(buf);
                buf.set_selection(range);
            }
            Mode::Insert | Mode::Command => {}
        }
    }

    // -- Visual -------------------------------------------------------------

    fn selection<B: TextBuffer + ?Sized>(&self, buf: &B) -> Region {
        let kind = self
            .mode
            .visual_kind()
            .map_or(RangeKind::Inclusive, VisualKind::range_kind);
        Region::new(self.anchor, buf.cursor(), kind)
    }

    fn enter_visual<B: TextBuffer + ?Sized>(&mut self, buf: &B, kind: VisualKind) {
        self.anchor = buf.cursor();
        self.set_mode(Mode::Visual(kind));
    }

    fn leave_visual<B: TextBuffer + ?Sized>(&mut self, buf: &mut B) {
        buf.clear_selection();
        self.set_mode(Mode::Normal);
    }

    // -- Normal & Visual keys -----------------------------------------------

    fn command_key<B: TextBuffer + ?Sized>(&mut self, buf: &mut B, key: KeyEvent) {
        if self.parser.is_idle() {
            self.message = None;
            if self.mode.is_visual() && key.code == KeyCode::Escape {
                self.leave_visual(buf);
                self.settle(buf);
                return;
            }
        }

        let ctx = if self.mode.is_visual() {
            Context::Visual
        } else {
            Context::Normal
        };
        let (parser, parse) = mem::take(&mut self.parser).feed(&key, ctx);
        self.parser = parser;
        match parse {
            Parse::Pending => {}
            Parse::Invalid => trace!(key = %key, "discarded keys"),
            Parse::Complete(cmd) => self.execute(buf, &cmd),
        }
    }

    fn execute<B: TextBuffer + ?Sized>(&mut self, buf: &mut B, cmd: &Command) {
        debug!(?cmd, mode = %self.mode, "command");
        let grouped = !matches!(
            cmd.action,
            Action::Direct(
                Direct::Undo
                    | Direct::Redo
                    | Direct::NextBuffer
                    | Direct::PreviousBuffer
                    | Direct::SaveAndClose
            )
        );
        if grouped {
            buf.begin_edit();
        }
        if !matches!(cmd.action, Action::Move(Motion::Down | Motion::Up)) {
            self.sticky_col = None;
        }

        match cmd.action {
            Action::Move(motion) => self.move_cursor(buf, motion, cmd.count),
            Action::Operate(op, target) => self.operate(buf, op, target, cmd),
            Action::OperateLines(op) => {
                let line = buf.cursor().line;
                let last = line.saturating_add(cmd.times() - 1).min(host::last_line(buf));
                self.apply_operator(buf, op, Region::lines(line, last), cmd.register, 1);
            }
            Action::OperateSelection(op) => {
                let region = self.selection(buf);
                self.leave_visual(buf);
                self.apply_operator(buf, op, region, cmd.register, cmd.times());
            }
            Action::SelectObject(object) => {
                let region = object.resolve(buf, buf.cursor());
                let end = if region.kind == RangeKind::Exclusive {
                    host::prev_pos(buf, region.end)
                        .filter(|&pos| pos >= region.start)
                        .unwrap_or(region.start)
                } else {
                    region.end
                };
                self.anchor = region.start;
                buf.set_cursor(end);
                self.set_mode(Mode::Visual(VisualKind::Char));
            }
            Action::Direct(direct) => self.direct(buf, direct, cmd),
            Action::Switch(switch) => self.switch(buf, switch),
        }

        if grouped && self.mode != Mode::Insert {
            buf.end_edit();
        }
        self.settle(buf);
    }

    // -- Motions ------------------------------------------------------------

    fn armed_search(&self) -> Option<(&Pattern, SearchDirection)> {
        let (_, direction) = self.search.last()?;
        self.pattern.as_ref().map(|pattern| (pattern, direction))
    }

    fn rearm_search(&mut self) {
        self.pattern = self
            .search
            .last()
            .map(|(source, _)| Pattern::new(source, self.options.ignorecase, self.options.smartcase));
    }

    fn move_cursor<B: TextBuffer + ?Sized>(&mut self, buf: &mut B, motion: Motion, count: Option<usize>) {
        let from = buf.cursor();
        let sticky = match motion {
            Motion::Down | Motion::Up => Some(self.sticky_col.unwrap_or(from.col)),
            Motion::LineEnd => Some(usize::MAX),
            _ => None,
        };
        let env = MotionEnv {
            count,
            past_end: self.mode.is_visual(),
            sticky_col: sticky.filter(|_| motion.is_vertical()),
            search: self.armed_search(),
            wrapscan: self.options.wrapscan,
            ..MotionEnv::new()
        };
        let armed = env.search.map(|(_, direction)| direction);
        let jump = motion.resolve(buf, from, &env);

        if let Some(jump) = jump {
            buf.set_cursor(jump.pos);
            self.sticky_col = sticky;
        }
        if matches!(motion, Motion::SearchNext | Motion::SearchPrev) {
            self.message = search_message(
                self.search.last().map(|(source, _)| source),
                armed.map(|dir| if motion == Motion::SearchNext { dir } else { dir.opposite() }),
                from,
                jump.map(|j| j.pos),
            );
        }
    }

    // -- Operators ----------------------------------------------------------

    fn operate<B: TextBuffer + ?Sized>(&mut self, buf: &mut B, op: Operator, target: Target, cmd: &Command) {
        let from = buf.cursor();
        let region = match target {
            Target::Motion(motion) => {
                // `cw` on a word changes to its end, like `ce`.
                let on_word = host::char_at(buf, from).is_some_and(|c| !c.is_whitespace());
                let motion = if op == Operator::Change && motion == Motion::WordForward && on_word {
                    Motion::WordEnd
                } else {
                    motion
                };
                let env = MotionEnv {
                    count: cmd.count,
                    operator: true,
                    past_end: true,
                    search: self.armed_search(),
                    wrapscan: self.options.wrapscan,
                    ..MotionEnv::new()
                };
                let Some(jump) = motion.resolve(buf, from, &env) else {
                    trace!(?motion, "operator target did not resolve");
                    return;
                };
                Region::new(from, jump.pos, jump.kind)
            }
            Target::Object(object) => object.resolve(buf, from),
        };
        self.apply_operator(buf, op, region, cmd.register, 1);
    }

    fn apply_operator<B: TextBuffer + ?Sized>(
        &mut self,
        buf: &mut B,
        op: Operator,
        region: Region,
        register: Option<char>,
        times: usize,
    ) {
        let mut ctx = OperatorContext {
            registers: &mut self.registers,
            register,
            cursor: buf.cursor(),
            shiftwidth: self.options.shiftwidth,
            times,
        };
        let outcome = op.apply(buf, region, &mut ctx);
        buf.set_cursor(outcome.cursor);
        if outcome.message.is_some() {
            self.message = outcome.message;
        }
        if outcome.insert {
            self.set_mode(Mode::Insert);
        }
    }

    // -- Direct commands ----------------------------------------------------

    fn direct<B: TextBuffer + ?Sized>(&mut self, buf: &mut B, direct: Direct, cmd: &Command) {
        let n = cmd.times();
        let visual = self.mode.is_visual().then(|| self.selection(buf));
        if visual.is_some() {
            self.leave_visual(buf);
        }
        let cursor = buf.cursor();

        match direct {
            Direct::DeleteChar => match visual {
                Some(region) => self.apply_operator(buf, Operator::Delete, region, cmd.register, 1),
                None => self.operate(buf, Operator::Delete, Target::Motion(Motion::Right), cmd),
            },
            Direct::DeleteToEnd | Direct::ChangeToEnd => {
                let op = if direct == Direct::DeleteToEnd {
                    Operator::Delete
                } else {
                    Operator::Change
                };
                match visual {
                    Some(region) => {
                        let lines = Region::lines(region.start.line, region.end.line);
                        self.apply_operator(buf, op, lines, cmd.register, 1);
                    }
                    None => self.operate(buf, op, Target::Motion(Motion::LineEnd), cmd),
                }
            }
            Direct::Join => {
                let (first, last) = match visual {
                    Some(region) => (region.start.line, region.end.line.max(region.start.line + 1)),
                    None => (cursor.line, cursor.line.saturating_add(n.max(2) - 1)),
                };
                if let Some(pos) = edit::join_lines(buf, first, last) {
                    buf.set_cursor(pos);
                }
            }
            Direct::ToggleCase => {
                let pos = match visual {
                    Some(region) => edit::toggle_case_region(buf, region),
                    None => edit::toggle_case(buf, cursor, n),
                };
                buf.set_cursor(pos);
            }
            Direct::Replace(ch) => {
                let pos = match visual {
                    Some(region) => Some(edit::replace_region(buf, region, ch)),
                    None => edit::replace_chars(buf, cursor, ch, n),
                };
                if let Some(pos) = pos {
                    buf.set_cursor(pos);
                }
            }
            Direct::PasteAfter | Direct::PasteBefore => {
                let reg = edit::fetch_register(buf, &mut self.registers, cmd.register);
                let pos = match visual {
                    Some(region) => edit::paste_over(buf, &mut self.registers, &reg, region, n),
                    None if direct == Direct::PasteAfter => edit::paste(buf, &reg, cursor, Side::After, n),
                    None => edit::paste(buf, &reg, cursor, Side::Before, n),
                };
                buf.set_cursor(pos);
            }
            Direct::Undo => (0..n).for_each(|_| buf.undo()),
            Direct::Redo => (0..n).for_each(|_| buf.redo()),
            Direct::NextBuffer => (0..n).for_each(|_| buf.next_buffer()),
            Direct::PreviousBuffer => (0..n).for_each(|_| buf.previous_buffer()),
            Direct::SaveAndClose => {
                if self.save(buf) {
                    buf.close();
                }
            }
            Direct::CenterLine => buf.center_current_line(),
        }
    }

    // -- Mode switches ------------------------------------------------------

    fn switch<B: TextBuffer + ?Sized>(&mut self, buf: &mut B, switch: ModeSwitch) {
        if let Some(kind) = self.mode.visual_kind() {
            match switch {
                ModeSwitch::OpenBelow | ModeSwitch::OpenAbove => {
                    let cursor = buf.cursor();
                    buf.set_cursor(self.anchor);
                    self.anchor = cursor;
                    return;
                }
                ModeSwitch::VisualChar | ModeSwitch::VisualLine => {
                    let want = if switch == ModeSwitch::VisualChar {
                        VisualKind::Char
                    } else {
                        VisualKind::Line
                    };
                    if want == kind {
                        self.leave_visual(buf);
                    } else {
                        self.set_mode(Mode::Visual(want));
                    }
                    return;
                }
                ModeSwitch::SearchForward | ModeSwitch::SearchBackward => {}
                _ => self.leave_visual(buf),
            }
        }

        let cursor = buf.cursor();
        let len = host::line_len(buf, cursor.line);
        match switch {
            ModeSwitch::Insert => self.set_mode(Mode::Insert),
            ModeSwitch::Append => {
                buf.set_cursor(cursor.with_col((cursor.col + 1).min(len)));
                self.set_mode(Mode::Insert);
            }
            ModeSwitch::AppendEnd => {
                buf.set_cursor(cursor.with_col(len));
                self.set_mode(Mode::Insert);
            }
            ModeSwitch::InsertStart => {
                buf.set_cursor(cursor.with_col(host::leading_blanks(buf, cursor.line)));
                self.set_mode(Mode::Insert);
            }
            ModeSwitch::OpenBelow => {
                buf.insert_text(cursor.with_col(len), "\n");
                buf.set_cursor(Position::new(cursor.line + 1, 0));
                self.set_mode(Mode::Insert);
            }
            ModeSwitch::OpenAbove => {
                buf.insert_text(cursor.with_col(0), "\n");
                buf.set_cursor(cursor.with_col(0));
                self.set_mode(Mode::Insert);
            }
            ModeSwitch::VisualChar => self.enter_visual(buf, VisualKind::Char),
            ModeSwitch::VisualLine => self.enter_visual(buf, VisualKind::Line),
            ModeSwitch::CommandLine => self.open_prompt(buf, Prompt::Ex),
            ModeSwitch::SearchForward => self.open_prompt(buf, Prompt::Search(SearchDirection::Forward)),
            ModeSwitch::SearchBackward => self.open_prompt(buf, Prompt::Search(SearchDirection::Backward)),
        }
    }

    // -- Command line -------------------------------------------------------

    fn open_prompt<B: TextBuffer + ?Sized>(&mut self, buf: &B, prompt: Prompt) {
        self.return_mode = self.mode;
        self.origin = buf.cursor();
        self.cmdline = Some(CommandLine::new(prompt));
        self.set_mode(Mode::Command);
    }

    fn close_prompt<B: TextBuffer + ?Sized>(&mut self, buf: &mut B) {
        if let Some(Prompt::Search(_)) = self.cmdline.take().map(|line| line.prompt()) {
            buf.set_cursor(self.origin);
        }
        buf.clear_selection();
        self.set_mode(self.return_mode);
        self.settle(buf);
    }

    fn command_line_key<B: TextBuffer + ?Sized>(&mut self, buf: &mut B, key: KeyEvent) {
        let Some(line) = self.cmdline.as_mut() else {
            self.close_prompt(buf);
            return;
        };
        match key.code {
            KeyCode::Escape => return self.close_prompt(buf),
            KeyCode::Enter => return self.submit(buf),
            KeyCode::Backspace => {
                if !line.backspace() && line.is_empty() {
                    return self.close_prompt(buf);
                }
            }
            KeyCode::Delete => {
                line.delete();
            }
            KeyCode::Left => line.move_left(),
            KeyCode::Right => line.move_right(),
            KeyCode::Home => line.move_home(),
            KeyCode::End => line.move_end(),
            _ => match key.printable() {
                Some(ch) => line.insert_char(ch),
                None => return,
            },
        }
        self.preview_search(buf);
    }

    /// Show the match the typed pattern would find as the selection.
    fn preview_search<B: TextBuffer + ?Sized>(&self, buf: &mut B) {
        let Some(line) = &self.cmdline else { return };
        let Prompt::Search(direction) = line.prompt() else { return };
        if !self.options.incsearch {
            return;
        }
        if line.is_empty() {
            buf.clear_selection();
            return;
        }
        let pattern = Pattern::new(line.input(), self.options.ignorecase, self.options.smartcase);
        match search::find(buf, &pattern, self.origin, direction, self.options.wrapscan) {
            Some(start) => {
                let end = search::match_end(buf, &pattern, start);
                buf.set_selection(Range::new(start, end));
            }
            None => buf.clear_selection(),
        }
    }

    fn submit<B: TextBuffer + ?Sized>(&mut self, buf: &mut B) {
        let Some(line) = self.cmdline.take() else { return };
        buf.clear_selection();
        self.set_mode(self.return_mode);

        match line.prompt() {
            Prompt::Ex if line.input().trim().is_empty() => {}
            Prompt::Ex => self.run_ex(buf, command::parse_ex(line.input())),
            Prompt::Search(direction) => {
                if self.search.submit(line.input(), direction) {
                    self.rearm_search();
                    debug!(pattern = ?self.search.last(), "search armed");
                } else {
                    self.message = Some("E35: No previous regular expression".to_string());
                }
            }
        }
        self.settle(buf);
    }

    fn run_ex<B: TextBuffer + ?Sized>(&mut self, buf: &mut B, cmd: ExCommand) {
        debug!(?cmd, "ex command");
        match cmd {
            ExCommand::Write => {
                self.save(buf);
            }
            ExCommand::Quit => buf.close(),
            ExCommand::WriteQuit => {
                if self.save(buf) {
                    buf.close();
                }
            }
            ExCommand::Edit(None) => {
                if let Err(e) = buf.reload() {
                    self.report("reload", &e);
                }
            }
            ExCommand::Edit(Some(path)) => {
                if let Err(e) = buf.open(Some(&path)) {
                    self.report("open", &e);
                }
            }
            ExCommand::GotoLine(n) => {
                let line = n.saturating_sub(1).min(host::last_line(buf));
                buf.set_cursor(Position::new(line, host::first_non_blank(buf, line)));
            }
            ExCommand::Set(args) => {
                self.message = match self.set_options(&args) {
                    Ok(shown) => shown,
                    Err(e) => Some(e.to_string()),
                };
            }
            ExCommand::Unknown(input) => {
                self.message = Some(format!("E492: Not an editor command: {input}"));
            }
        }
    }

    fn save<B: TextBuffer + ?Sized>(&mut self, buf: &mut B) -> bool {
        match buf.save() {
            Ok(()) => {
                self.message = Some("written".to_string());
                true
            }
            Err(e) => {
                self.report("save", &e);
                false
            }
        }
    }

    fn report(&mut self, action: &str, error: &Error) {
        warn!(%error, "{action} failed");
        self.message = Some(error.to_string());
    }
}

/// Status text after `n`/`N`.
fn search_message(
    source: Option<&str>,
    direction: Option<SearchDirection>,
    from: Position,
    found: Option<Position>,
) -> Option<String> {
    let Some(direction) = direction else {
        return Some("E35: No previous regular expression".to_string());
    };
    let Some(found) = found else {
        return Some(format!("E486: Pattern not found: {}", source.unwrap_or_default()));
    };
    match direction {
        SearchDirection::Forward if found <= from => Some("search hit BOTTOM, continuing at TOP".to_string()),
        SearchDirection::Backward if found >= from => Some("search hit TOP, continuing at BOTTOM".to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
