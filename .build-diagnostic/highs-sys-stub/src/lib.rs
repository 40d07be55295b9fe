// DIAGNOSTIC STUB of `highs-sys` — pure Rust, no C/cmake.
// Exists only so `cargo check` can compile transcap in an environment
// lacking cmake/libclang. NOT part of the real build. Bodies are
// `unimplemented!()`; only the public surface/signatures matter.
#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use std::os::raw::{c_char, c_void};

pub type HighsInt = i32;

pub const MODEL_STATUS_NOTSET: HighsInt = 0;
pub const MODEL_STATUS_LOAD_ERROR: HighsInt = 1;
pub const MODEL_STATUS_MODEL_ERROR: HighsInt = 2;
pub const MODEL_STATUS_PRESOLVE_ERROR: HighsInt = 3;
pub const MODEL_STATUS_SOLVE_ERROR: HighsInt = 4;
pub const MODEL_STATUS_POSTSOLVE_ERROR: HighsInt = 5;
pub const MODEL_STATUS_MODEL_EMPTY: HighsInt = 6;
pub const MODEL_STATUS_OPTIMAL: HighsInt = 7;
pub const MODEL_STATUS_INFEASIBLE: HighsInt = 8;
pub const MODEL_STATUS_UNBOUNDED_OR_INFEASIBLE: HighsInt = 9;
pub const MODEL_STATUS_UNBOUNDED: HighsInt = 10;
pub const MODEL_STATUS_OBJECTIVE_BOUND: HighsInt = 11;
pub const MODEL_STATUS_OBJECTIVE_TARGET: HighsInt = 12;
pub const MODEL_STATUS_REACHED_TIME_LIMIT: HighsInt = 13;
pub const MODEL_STATUS_REACHED_ITERATION_LIMIT: HighsInt = 14;
pub const MODEL_STATUS_UNKNOWN: HighsInt = 15;
pub const MODEL_STATUS_REACHED_SOLUTION_LIMIT: HighsInt = 16;
pub const MODEL_STATUS_REACHED_INTERRUPT: HighsInt = 17;
pub const MODEL_STATUS_REACHED_MEMORY_LIMIT: HighsInt = 18;
pub const MODEL_STATUS_MIN: HighsInt = MODEL_STATUS_NOTSET;
pub const MODEL_STATUS_MAX: HighsInt = MODEL_STATUS_REACHED_MEMORY_LIMIT;

pub const STATUS_OK: HighsInt = 0;
pub const STATUS_WARNING: HighsInt = 1;
pub const STATUS_ERROR: HighsInt = -1;

pub const SOLUTION_STATUS_NONE: HighsInt = 0;
pub const SOLUTION_STATUS_INFEASIBLE: HighsInt = 1;
pub const SOLUTION_STATUS_FEASIBLE: HighsInt = 2;

pub const MATRIX_FORMAT_NONE: HighsInt = 0;
pub const MATRIX_FORMAT_COLUMN_WISE: HighsInt = 1;
pub const MATRIX_FORMAT_ROW_WISE: HighsInt = 2;

pub const OBJECTIVE_SENSE_MINIMIZE: HighsInt = 1;
pub const OBJECTIVE_SENSE_MAXIMIZE: HighsInt = -1;

pub const VAR_TYPE_CONTINUOUS: HighsInt = 0;
pub const VAR_TYPE_INTEGER: HighsInt = 1;
pub const VAR_TYPE_SEMI_CONTINUOUS: HighsInt = 2;
pub const VAR_TYPE_SEMI_INTEGER: HighsInt = 3;
pub const VAR_TYPE_IMPLICIT_INTEGER: HighsInt = 4;

pub unsafe extern "C" fn Highs_create() -> *mut c_void {
    unimplemented!()
}
pub unsafe extern "C" fn Highs_destroy(_highs: *mut c_void) {
    unimplemented!()
}
pub unsafe extern "C" fn Highs_run(_highs: *mut c_void) -> HighsInt {
    unimplemented!()
}
pub unsafe extern "C" fn Highs_passLp(
    _highs: *mut c_void,
    _num_col: HighsInt,
    _num_row: HighsInt,
    _num_nz: HighsInt,
    _a_format: HighsInt,
    _sense: HighsInt,
    _offset: f64,
    _col_cost: *const f64,
    _col_lower: *const f64,
    _col_upper: *const f64,
    _row_lower: *const f64,
    _row_upper: *const f64,
    _a_start: *const HighsInt,
    _a_index: *const HighsInt,
    _a_value: *const f64,
) -> HighsInt {
    unimplemented!()
}
pub unsafe extern "C" fn Highs_passMip(
    _highs: *mut c_void,
    _num_col: HighsInt,
    _num_row: HighsInt,
    _num_nz: HighsInt,
    _a_format: HighsInt,
    _sense: HighsInt,
    _offset: f64,
    _col_cost: *const f64,
    _col_lower: *const f64,
    _col_upper: *const f64,
    _row_lower: *const f64,
    _row_upper: *const f64,
    _a_start: *const HighsInt,
    _a_index: *const HighsInt,
    _a_value: *const f64,
    _integrality: *const HighsInt,
) -> HighsInt {
    unimplemented!()
}
pub unsafe extern "C" fn Highs_addRow(
    _highs: *mut c_void,
    _lower: f64,
    _upper: f64,
    _num_new_nz: HighsInt,
    _indices: *const HighsInt,
    _values: *const f64,
) -> HighsInt {
    unimplemented!()
}
pub unsafe extern "C" fn Highs_addCol(
    _highs: *mut c_void,
    _cost: f64,
    _lower: f64,
    _upper: f64,
    _num_new_nz: HighsInt,
    _indices: *const HighsInt,
    _values: *const f64,
) -> HighsInt {
    unimplemented!()
}
pub unsafe extern "C" fn Highs_changeObjectiveSense(
    _highs: *mut c_void,
    _sense: HighsInt,
) -> HighsInt {
    unimplemented!()
}
pub unsafe extern "C" fn Highs_getModelStatus(_highs: *const c_void) -> HighsInt {
    unimplemented!()
}
pub unsafe extern "C" fn Highs_getNumCols(_highs: *const c_void) -> HighsInt {
    unimplemented!()
}
pub unsafe extern "C" fn Highs_getNumRows(_highs: *const c_void) -> HighsInt {
    unimplemented!()
}
pub unsafe extern "C" fn Highs_getObjectiveValue(_highs: *const c_void) -> f64 {
    unimplemented!()
}
pub unsafe extern "C" fn Highs_getSolution(
    _highs: *const c_void,
    _col_value: *mut f64,
    _col_dual: *mut f64,
    _row_value: *mut f64,
    _row_dual: *mut f64,
) -> HighsInt {
    unimplemented!()
}
pub unsafe extern "C" fn Highs_setSolution(
    _highs: *mut c_void,
    _col_value: *const f64,
    _row_value: *const f64,
    _col_dual: *const f64,
    _row_dual: *const f64,
) -> HighsInt {
    unimplemented!()
}
pub unsafe extern "C" fn Highs_getDoubleInfoValue(
    _highs: *const c_void,
    _info: *const c_char,
    _value: *mut f64,
) -> HighsInt {
    unimplemented!()
}
pub unsafe extern "C" fn Highs_setBoolOptionValue(
    _highs: *mut c_void,
    _option: *const c_char,
    _value: HighsInt,
) -> HighsInt {
    unimplemented!()
}
pub unsafe extern "C" fn Highs_setIntOptionValue(
    _highs: *mut c_void,
    _option: *const c_char,
    _value: HighsInt,
) -> HighsInt {
    unimplemented!()
}
pub unsafe extern "C" fn Highs_setDoubleOptionValue(
    _highs: *mut c_void,
    _option: *const c_char,
    _value: f64,
) -> HighsInt {
    unimplemented!()
}
pub unsafe extern "C" fn Highs_setStringOptionValue(
    _highs: *mut c_void,
    _option: *const c_char,
    _value: *const c_char,
) -> HighsInt {
    unimplemented!()
}
pub unsafe extern "C" fn Highs_setOptionValue(
    _highs: *mut c_void,
    _option: *const c_char,
    _value: *const c_char,
) -> HighsInt {
    unimplemented!()
}
