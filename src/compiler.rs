//! Mount plan compiler
//!
//! Folds a base profile and an ordered chain of overlay profiles into one
//! [`MountPlan`], then attaches the fragments of every agent the base
//! profile selects.

use profile_schema::{
    AgentFragment, AgentVisibility, AgentsSpec, ConfigBlock, ConfigTree, ConfigValue, ModuleRecord,
    MountPlan, Profile, SessionMount, ValidationError,
};
use tracing::Dispatch;

use crate::loader::AgentLoader;
use crate::merge::{merge_dicts, merge_module_lists, IdField};
use crate::profile::merge_profile;

/// Errors resolving an agent against a compiled plan
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("agent '{0}' is not part of the mount plan")]
    UnknownAgent(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Compiles profiles into mount plans.
///
/// Without an agent loader the plan's `agents` list is always empty. Log
/// events go to the injected dispatch when one is set, otherwise to the
/// caller's current default.
#[derive(Default)]
pub struct Compiler<'a> {
    loader: Option<&'a dyn AgentLoader>,
    dispatch: Option<Dispatch>,
}

impl<'a> Compiler<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agent_loader(mut self, loader: &'a dyn AgentLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Compile `base` with `overlays` applied in order.
    pub fn compile(&self, base: &Profile, overlays: &[Profile]) -> MountPlan {
        self.scoped(|| {
            let mut plan = initial_plan(base);
            for overlay in overlays {
                apply_overlay(&mut plan, overlay);
            }
            if let Some(loader) = self.loader {
                plan.agents = load_agents(base, loader);
            }
            tracing::info!(
                profile = %base.metadata.name,
                overlays = overlays.len(),
                agents = plan.agents.len(),
                "compiled mount plan"
            );
            plan
        })
    }

    /// Session tree seen by agent `name`: the plan with that agent's
    /// fragment merged over it.
    pub fn resolve_agent_session(&self, plan: &MountPlan, name: &str) -> Result<ConfigTree, CompileError> {
        self.scoped(|| resolve_agent_session(plan, name))
    }

    fn scoped<T>(&self, f: impl FnOnce() -> T) -> T {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }
}

/// Compile with an optional loader and the caller's current log dispatch.
pub fn compile(base: &Profile, overlays: &[Profile], loader: Option<&dyn AgentLoader>) -> MountPlan {
    let mut compiler = Compiler::new();
    if let Some(loader) = loader {
        compiler = compiler.with_agent_loader(loader);
    }
    compiler.compile(base, overlays)
}

/// Merge the named agent's fragment over the plan's session tree.
///
/// The plan's `agents` are presented to the fragment as a name-keyed map so
/// the fragment's own `agents` and `exclude` entries can address them.
pub fn resolve_agent_session(plan: &MountPlan, name: &str) -> Result<ConfigTree, CompileError> {
    let fragment = plan
        .agent(name)
        .ok_or_else(|| CompileError::UnknownAgent(name.to_string()))?;
    let session = merge_profile(&plan.to_session_tree(), &fragment.body)?;
    tracing::debug!(agent = name, keys = session.len(), "resolved agent session");
    Ok(session)
}

fn initial_plan(base: &Profile) -> MountPlan {
    let orchestrator = &base.session.orchestrator;
    let context = &base.session.context;
    MountPlan {
        session: SessionMount {
            orchestrator: orchestrator.module.clone(),
            context: context.module.clone(),
            orchestrator_source: orchestrator.source.clone(),
            context_source: context.source.clone(),
        },
        orchestrator: config_block(orchestrator),
        context: config_block(context),
        providers: records(&base.providers),
        tools: records(&base.tools),
        hooks: records(&base.hooks),
        agents: Vec::new(),
    }
}

fn config_block(record: &ModuleRecord) -> Option<ConfigBlock> {
    record
        .config
        .as_ref()
        .filter(|config| !config.is_empty())
        .map(|config| ConfigBlock {
            config: config.clone(),
        })
}

fn records(modules: &[ModuleRecord]) -> Vec<ConfigTree> {
    modules.iter().map(ModuleRecord::to_tree).collect()
}

fn apply_overlay(plan: &mut MountPlan, overlay: &Profile) {
    let orchestrator = &overlay.session.orchestrator;
    plan.session.orchestrator = orchestrator.module.clone();
    plan.session.orchestrator_source = orchestrator.source.clone();
    merge_block(&mut plan.orchestrator, orchestrator);

    let context = &overlay.session.context;
    plan.session.context = context.module.clone();
    plan.session.context_source = context.source.clone();
    merge_block(&mut plan.context, context);

    plan.providers = merge_records(&plan.providers, &overlay.providers);
    plan.tools = merge_records(&plan.tools, &overlay.tools);
    plan.hooks = merge_records(&plan.hooks, &overlay.hooks);

    tracing::debug!(overlay = %overlay.metadata.name, "applied overlay");
}

fn merge_block(block: &mut Option<ConfigBlock>, record: &ModuleRecord) {
    let Some(config) = record.config.as_ref().filter(|config| !config.is_empty()) else {
        return;
    };
    let merged = match block.take() {
        Some(existing) => merge_dicts(&existing.config, config),
        None => config.clone(),
    };
    *block = Some(ConfigBlock { config: merged });
}

fn merge_records(current: &[ConfigTree], overlay: &[ModuleRecord]) -> Vec<ConfigTree> {
    let parent: Vec<ConfigValue> = current.iter().cloned().map(ConfigValue::Object).collect();
    let child: Vec<ConfigValue> = overlay
        .iter()
        .map(|record| ConfigValue::Object(record.to_tree()))
        .collect();
    merge_module_lists(&parent, &child, IdField::Module)
        .into_iter()
        .filter_map(|record| match record {
            ConfigValue::Object(tree) => Some(tree),
            _ => None,
        })
        .collect()
}

/// Agent names the base profile asks for, first occurrence kept.
fn agent_candidates(base: &Profile, loader: &dyn AgentLoader) -> Vec<String> {
    let listed = || match loader.list_agents() {
        Ok(names) => names,
        Err(err) => {
            tracing::warn!(error = %err, "agent listing failed, treating as empty");
            Vec::new()
        }
    };

    let names = match &base.agents {
        Some(AgentsSpec::Discovery(spec)) => match (spec.include_filter(), spec.search_dirs()) {
            (Some(include), _) => include.to_vec(),
            (None, Some(_)) => listed(),
            (None, None) => Vec::new(),
        },
        Some(AgentsSpec::Visibility(AgentVisibility::Only(names))) => names.clone(),
        Some(AgentsSpec::Visibility(AgentVisibility::All)) => listed(),
        Some(AgentsSpec::Visibility(AgentVisibility::None)) | None => Vec::new(),
    };

    let mut unique: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if !unique.contains(&name) {
            unique.push(name);
        }
    }
    unique
}

fn load_agents(base: &Profile, loader: &dyn AgentLoader) -> Vec<AgentFragment> {
    let candidates = agent_candidates(base, loader);
    let mut fragments = Vec::with_capacity(candidates.len());

    for name in &candidates {
        match loader.load_agent(name) {
            Ok(agent) => {
                tracing::debug!(agent = %name, "loaded agent");
                fragments.push(AgentFragment::new(name.clone(), agent.to_mount_plan_fragment()));
            }
            Err(err) => {
                tracing::warn!(agent = %name, error = %err, "failed to load agent, skipping");
            }
        }
    }

    if fragments.len() < candidates.len() {
        tracing::info!(
            loaded = fragments.len(),
            requested = candidates.len(),
            "some agents could not be loaded"
        );
    }
    fragments
}
