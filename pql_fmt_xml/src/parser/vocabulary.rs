// Document structure
pub const TAG_PROPERTY_SET: &str = "property-set";
pub const TAG_PROPERTY: &str = "property";
pub const TAG_ID: &str = "id";
pub const TAG_FORMULA: &str = "formula";
pub const TAG_TAGS: &str = "tags";
pub const TAG_IS_REACHABILITY: &str = "is-reachability";
pub const TAG_SMC: &str = "smc";
pub const TAG_OBSERVATIONS: &str = "observations";
pub const TAG_WATCH: &str = "watch";
// Global properties
pub const TAG_K_SAFE: &str = "k-safe";
pub const TAG_CONTROL: &str = "control";
// Reachability
pub const TAG_INVARIANT: &str = "invariant";
pub const TAG_IMPOSSIBILITY: &str = "impossibility";
pub const TAG_POSSIBILITY: &str = "possibility";
// CTL
pub const TAG_EXISTS_PATH: &str = "exists-path";
pub const TAG_ALL_PATHS: &str = "all-paths";
pub const TAG_NEXT: &str = "next";
pub const TAG_GLOBALLY: &str = "globally";
pub const TAG_FINALLY: &str = "finally";
pub const TAG_UNTIL: &str = "until";
pub const TAG_BEFORE: &str = "before";
pub const TAG_REACH: &str = "reach";
// Boolean formulae
pub const TAG_DEADLOCK: &str = "deadlock";
pub const TAG_TRUE: &str = "true";
pub const TAG_FALSE: &str = "false";
pub const TAG_NEGATION: &str = "negation";
pub const TAG_CONJUNCTION: &str = "conjunction";
pub const TAG_DISJUNCTION: &str = "disjunction";
pub const TAG_EXCLUSIVE_DISJUNCTION: &str = "exclusive-disjunction";
pub const TAG_IMPLICATION: &str = "implication";
pub const TAG_EQUIVALENCE: &str = "equivalence";
pub const TAG_INTEGER_EQ: &str = "integer-eq";
pub const TAG_INTEGER_NE: &str = "integer-ne";
pub const TAG_INTEGER_LT: &str = "integer-lt";
pub const TAG_INTEGER_LE: &str = "integer-le";
pub const TAG_INTEGER_GT: &str = "integer-gt";
pub const TAG_INTEGER_GE: &str = "integer-ge";
// Integer expressions
pub const TAG_INTEGER_CONSTANT: &str = "integer-constant";
pub const TAG_TOKENS_COUNT: &str = "tokens-count";
pub const TAG_PLACE: &str = "place";
pub const TAG_INTEGER_SUM: &str = "integer-sum";
pub const TAG_INTEGER_PRODUCT: &str = "integer-product";
pub const TAG_INTEGER_DIFFERENCE: &str = "integer-difference";
// SMC attributes
pub const ATTR_TIME_BOUND: &str = "time-bound";
pub const ATTR_STEP_BOUND: &str = "step-bound";
pub const ATTR_FALSE_POSITIVES: &str = "false-positives";
pub const ATTR_FALSE_NEGATIVES: &str = "false-negatives";
pub const ATTR_INDIFFERENCE: &str = "indifference";
pub const ATTR_CONFIDENCE: &str = "confidence";
pub const ATTR_INTERVAL_WIDTH: &str = "interval-width";
pub const ATTR_COMPARE_TO: &str = "compare-to";
// Observables
pub const ATTR_NAME: &str = "name";
// Values
pub const VAL_TRUE: &str = "true";
