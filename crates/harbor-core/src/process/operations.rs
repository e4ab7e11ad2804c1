use sysinfo::{Pid as SysinfoPid, ProcessesToUpdate, System};

use crate::process::errors::ProcessError;
use crate::process::types::{Pid, ProcessInfo, ProcessStatus};

/// Check if a process with the given PID is currently running.
///
/// The hosted-request subsystem reports guest exits without a reason code;
/// callers that need to distinguish "still alive" from "already gone" after
/// an interruption use this.
pub fn is_process_running(pid: Pid) -> bool {
    let mut system = System::new();
    let pid_obj = pid.to_sysinfo_pid();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid_obj]), true);
    system.process(pid_obj).is_some()
}

/// Kill a guest process, validating its identity first.
///
/// A pid may be reused by an unrelated process between the time a guest
/// exits and the time the host reacts. When `expected_start_time` is known
/// it must match the live process exactly; otherwise the kill is refused
/// with `PidReused` rather than risk killing the wrong process.
pub fn kill_process(pid: Pid, expected_start_time: Option<u64>) -> Result<(), ProcessError> {
    let mut system = System::new();
    let pid_obj = SysinfoPid::from_u32(pid.as_u32());
    system.refresh_processes(ProcessesToUpdate::Some(&[pid_obj]), true);

    match system.process(pid_obj) {
        Some(process) => {
            if let Some(start_time) = expected_start_time
                && process.start_time() != start_time
            {
                return Err(ProcessError::PidReused {
                    pid: pid.as_u32(),
                    expected: format!("start_time={}", start_time),
                    actual: format!("start_time={}", process.start_time()),
                });
            }

            if process.kill() {
                Ok(())
            } else {
                Err(ProcessError::KillFailed {
                    pid: pid.as_u32(),
                    message: "Process kill signal failed".to_string(),
                })
            }
        }
        None => Err(ProcessError::NotFound { pid: pid.as_u32() }),
    }
}

/// Get basic information about a process.
pub fn get_process_info(pid: Pid) -> Result<ProcessInfo, ProcessError> {
    let mut system = System::new();
    let pid_obj = pid.to_sysinfo_pid();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid_obj]), true);

    match system.process(pid_obj) {
        Some(process) => Ok(ProcessInfo {
            pid,
            name: process.name().to_string_lossy().to_string(),
            status: ProcessStatus::from(process.status()),
            start_time: process.start_time(),
        }),
        None => Err(ProcessError::NotFound { pid: pid.as_u32() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_process_is_running() {
        let pid = Pid::from_raw(std::process::id());
        assert!(is_process_running(pid));
    }

    #[test]
    fn test_nonexistent_process_not_running() {
        // PIDs near the u32 maximum are far beyond any real pid range.
        let pid = Pid::from_raw(u32::MAX - 1);
        assert!(!is_process_running(pid));
    }

    #[test]
    fn test_kill_nonexistent_process_fails() {
        let result = kill_process(Pid::from_raw(u32::MAX - 1), None);
        assert!(matches!(result, Err(ProcessError::NotFound { .. })));
    }

    #[test]
    fn test_kill_with_wrong_start_time_refused() {
        let pid = Pid::from_raw(std::process::id());
        // A start time of 1 can't match any process started after 1970.
        let result = kill_process(pid, Some(1));
        assert!(matches!(result, Err(ProcessError::PidReused { .. })));
    }

    #[test]
    fn test_get_process_info_for_self() {
        let info = get_process_info(Pid::from_raw(std::process::id())).unwrap();
        assert!(!info.name.is_empty());
        assert!(info.start_time > 0);
    }
}
