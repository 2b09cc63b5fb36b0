use crate::frontend::token::FunctionId;
use crate::lang::expr::{Block, ExitCondition, Expr};
use crate::lang::program::Program;
use crate::runtime::context::Context;
use crate::runtime::host::{Host, StdHost};
use crate::runtime::runtime_error::{Diagnostic, RuntimeError, RuntimeErrorKind};
use std::time::Duration;
use tracing::{debug, warn};

/// Upper bound (exclusive) of the `%` opcode.
pub const RANDOM_BOUND: i64 = 100;
/// Milliseconds slept per unit of the current cell by `Z`.
pub const SLEEP_UNIT_MS: i64 = 100;

#[derive(Debug, Clone)]
pub struct VMConfig {
    /// Maximum number of nested function calls.
    pub max_call_depth: usize,
    /// Maximum number of evaluated nodes and loop iterations per run.
    pub max_steps: Option<usize>,
}

impl Default for VMConfig {
    fn default() -> Self {
        VMConfig {
            max_call_depth: 256,
            max_steps: None,
        }
    }
}

/// Tree-walking evaluator.
///
/// Each `run` evaluates a program against a fresh `Context`. Fatal faults
/// abort the run with a `RuntimeError`; soft faults are logged and collected
/// as diagnostics.
pub struct VM<H: Host = StdHost> {
    host: H,
    config: VMConfig,
    steps: usize,
    diagnostics: Vec<Diagnostic>,
}

impl VM<StdHost> {
    pub fn new() -> Self {
        Self::with_host(StdHost)
    }
}

impl Default for VM<StdHost> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> VM<H> {
    pub fn with_host(host: H) -> Self {
        Self::with_config(host, VMConfig::default())
    }

    pub fn with_config(host: H, config: VMConfig) -> Self {
        VM {
            host,
            config,
            steps: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Soft faults reported so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Runs `program` from a fresh context.
    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        let mut ctx = Context::new();
        self.execute(&mut ctx, program)
    }

    /// Runs `program` against an existing context, so its final state can be
    /// inspected afterwards. The step budget starts over on every call.
    pub fn execute<'p>(
        &mut self,
        ctx: &mut Context<'p>,
        program: &'p Program,
    ) -> Result<(), RuntimeError> {
        self.steps = 0;
        self.execute_all(ctx, &program.expressions)
    }

    fn execute_all<'p>(
        &mut self,
        ctx: &mut Context<'p>,
        exprs: &'p [Expr],
    ) -> Result<(), RuntimeError> {
        for expr in exprs {
            self.execute_expr(ctx, expr)?;
        }
        Ok(())
    }

    fn check_limits(&mut self) -> Result<(), RuntimeError> {
        self.steps += 1;
        if let Some(max) = self.config.max_steps {
            if self.steps > max {
                return Err(RuntimeErrorKind::StepLimitExceeded(max).into());
            }
        }
        Ok(())
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    fn execute_expr<'p>(
        &mut self,
        ctx: &mut Context<'p>,
        expr: &'p Expr,
    ) -> Result<(), RuntimeError> {
        self.check_limits()?;

        match expr {
            // Cursor
            Expr::MovePointer(delta) => ctx.current_frame_mut().move_pointer(*delta)?,
            Expr::ReturnToStart => ctx.current_frame_mut().return_to_start(),

            // Cells
            Expr::IncrementCell(delta) => ctx.current_frame_mut().increment_cell(*delta)?,
            Expr::Reset => ctx.current_frame_mut().set_cell(0),
            Expr::Random => {
                let value = self.host.random_below(RANDOM_BOUND);
                ctx.current_frame_mut().set_cell(value);
            }

            // Registers
            Expr::Write => ctx.current_frame_mut().write(),
            Expr::Read => ctx.current_frame_mut().read(),
            Expr::FunctionReadResult => ctx.current_frame_mut().read_return(),
            Expr::Swap => ctx.current_frame_mut().swap(),
            Expr::Flush => ctx.current_frame_mut().flush(),

            // I/O
            Expr::PrintNumber => {
                let value = ctx.current_frame_mut().cell();
                self.host.write_str(&value.to_string())?;
            }
            Expr::PrintChar => {
                let value = ctx.current_frame_mut().cell();
                let ch = u32::try_from(value)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or(RuntimeErrorKind::InvalidCodePoint(value))?;
                self.host.write_str(ch.encode_utf8(&mut [0; 4]))?;
            }
            Expr::Newline => self.host.write_str("\n")?,
            Expr::Pause => self.host.read_line()?,
            Expr::Sleep => {
                let value = ctx.current_frame_mut().cell();
                if value < 0 {
                    return Err(RuntimeErrorKind::NegativeSleep(value).into());
                }
                let millis = value
                    .checked_mul(SLEEP_UNIT_MS)
                    .ok_or(RuntimeErrorKind::CellOverflow)?;
                self.host.sleep(Duration::from_millis(millis as u64));
            }
            // Reserved opcode without behaviour.
            Expr::Recycle => {}
            Expr::Nop => {}

            // Structure
            Expr::Block(block) => self.execute_all(ctx, block.exprs())?,
            Expr::Loop { condition, body } => self.execute_loop(ctx, *condition, body)?,
            Expr::FunctionDecl { id, body } => match ctx.register(*id, body) {
                Ok(()) => debug!(id = id.get(), len = body.len(), "registered function"),
                Err(diagnostic) => self.report(diagnostic),
            },
            Expr::FunctionCall(id) => self.call_function(ctx, *id)?,
        }

        Ok(())
    }

    /// The condition is read from whatever cell the cursor is on at each check.
    fn execute_loop<'p>(
        &mut self,
        ctx: &mut Context<'p>,
        condition: ExitCondition,
        body: &'p Block,
    ) -> Result<(), RuntimeError> {
        while !condition.is_met(ctx.current_frame_mut().cell()) {
            self.check_limits()?;
            self.execute_all(ctx, body.exprs())?;
        }
        Ok(())
    }

    /// Runs function `id` in a new frame seeded with the caller's current
    /// cell. The frame is pushed and popped even when `id` is not declared.
    fn call_function<'p>(
        &mut self,
        ctx: &mut Context<'p>,
        id: FunctionId,
    ) -> Result<(), RuntimeError> {
        if ctx.depth() > self.config.max_call_depth {
            return Err(RuntimeError::new(RuntimeErrorKind::CallDepthExceeded(
                self.config.max_call_depth,
            ))
            .with_context(id));
        }

        ctx.push_frame();

        match ctx.function(id) {
            Some(body) => {
                debug!(id = id.get(), depth = ctx.depth(), "call function");
                self.execute_all(ctx, body.exprs())
                    .map_err(|e| e.with_context(id))?;
            }
            None => self.report(Diagnostic::UndefinedFunction(id)),
        }

        ctx.pop_frame()
    }
}
