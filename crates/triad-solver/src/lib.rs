pub mod evaluate;
pub mod orchestrate;

pub use evaluate::{
    CardStrengthModel, EvalContext, EvalWeights, ExpectedResult, MoveChoice, MoveEvaluator,
    PatternTable, RolloutBudget,
};
pub use orchestrate::{
    OptimizerGate, SolverConfig, SolverErrorKind, SolverEvent, SolverOrchestrator, SolverState,
};
