pub mod application;
pub mod connector;
pub mod domain;

pub use application::{
    AccessControlGate, AuthorizationProvider, CreateRepoUseCase, GateOutcome, GetRepoUseCase,
    ListOutcome, ListReposUseCase, MatchTier, RepoStore,
};

pub use connector::{
    init_tracing, Container, ContainerConfig, DenyAllAuthorizationProvider, DuckdbRepoStore,
    InMemoryRepoStore, StaticAuthorizationProvider,
};

pub use domain::{
    Actor, DomainError, NewRepo, Repo, RepoListOp, RequestContext, DEFAULT_BRANCH, DEFAULT_PER_PAGE,
};
