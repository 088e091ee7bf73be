mod penalty;
mod poisson_mms_common;
