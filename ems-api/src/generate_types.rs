//! TypeScript bindings for the request and response types.
//!
//! Running the test below writes one `.ts` file per `#[ts(export)]` type
//! into `EMS_TS_OUTPUT_DIR`, or `../ts-bindings` when it is unset.

#[cfg(test)]
mod tests {
    use std::{env, path::Path};

    use ts_rs::TS;

    macro_rules! export_types {
        ($($ty:ty),+ $(,)?) => {
            $(
                <$ty>::export().expect(concat!("Failed to export ", stringify!($ty)));
            )+
        };
    }

    #[test]
    fn generate_typescript_types() {
        let output_dir_str =
            env::var("EMS_TS_OUTPUT_DIR").unwrap_or_else(|_| "../ts-bindings".to_string());
        println!("Writing TypeScript bindings to {}", output_dir_str);
        let output_dir = Path::new(&output_dir_str);

        if !output_dir.exists() {
            std::fs::create_dir_all(output_dir).expect("Failed to create output directory");
        }

        // Stale bindings of renamed or removed types would otherwise linger.
        for entry in std::fs::read_dir(output_dir).expect("Failed to read output directory") {
            let path = entry.expect("Failed to read directory entry").path();
            if path.extension().and_then(|s| s.to_str()) == Some("ts") {
                std::fs::remove_file(&path)
                    .unwrap_or_else(|e| panic!("Failed to remove {:?}: {}", path, e));
            }
        }

        unsafe {
            env::set_var("TS_RS_EXPORT_DIR", output_dir);
        }

        use crate::{
            api::{
                MessageResponse, StatusRequest,
                announcement::AnnouncementRequest,
                attendance::{MarkRequest, MarkResponse},
                auth::{LoginRequest, LoginResponse, LoginUser, RegisterRequest, RegisterResponse},
                chat::ChatRequest,
                company::CompanyDetails,
                employee::{
                    BulkEmployeeRow, EmploymentStatusRequest, NewEmployeeRequest,
                    RoleChangeRequest,
                },
                helpdesk::ReplyRequest,
                settings::{
                    DesignationRequest, HolidayRequest, OfficeTimingsRequest, TimezoneSetting,
                },
                status::ServiceStatus,
            },
            attendance::AttendanceStatus,
            broadcaster::{ChatEvent, Topic},
            error::ErrorResponse,
            identity::{EmploymentStatus, Role},
            models::*,
            orm::{
                company::{CompanyStat, PlatformStats},
                leave::LeaveApplication,
                reports::{
                    AttendanceTrendItem, CalendarEvent, ChartDataItem, DashboardStats,
                    OrgChartNode, ReportSummary,
                },
                settings::OfficeTimings,
                user::{BulkImportResult, TemporaryCredential},
            },
        };

        export_types!(
            // identity and errors
            Role,
            EmploymentStatus,
            ErrorResponse,
            MessageResponse,
            StatusRequest,
            ServiceStatus,
            // auth and company
            RegisterRequest,
            RegisterResponse,
            LoginRequest,
            LoginResponse,
            LoginUser,
            Company,
            CompanyDetails,
            CompanyStat,
            PlatformStats,
            // employees and departments
            User,
            EmployeeProfile,
            EmployeeSummary,
            ProfileChanges,
            NewEmployeeRequest,
            BulkEmployeeRow,
            BulkImportResult,
            TemporaryCredential,
            EmploymentStatusRequest,
            RoleChangeRequest,
            Department,
            DepartmentFields,
            DepartmentView,
            // settings
            Designation,
            DesignationRequest,
            Holiday,
            HolidayRequest,
            OfficeTimings,
            OfficeTimingsRequest,
            TimezoneSetting,
            // attendance and leave
            AttendanceStatus,
            AttendanceRecord,
            AttendanceView,
            MarkRequest,
            MarkResponse,
            LeaveStatus,
            LeaveRequest,
            LeaveApplication,
            // work items
            TaskStatus,
            Task,
            TaskFields,
            TaskView,
            HelpdeskTicket,
            TicketFields,
            TicketReply,
            TicketWithReplies,
            ReplyRequest,
            Document,
            Goal,
            GoalFields,
            PerformanceReview,
            ReviewFields,
            SalaryStructure,
            SalaryStructureView,
            ChecklistItem,
            ChecklistUpdate,
            // messaging
            Announcement,
            AnnouncementRequest,
            Notification,
            ChatMessage,
            ChatRequest,
            ChatEvent,
            Topic,
            // reports
            DashboardStats,
            ChartDataItem,
            AttendanceTrendItem,
            ReportSummary,
            OrgChartNode,
            CalendarEvent,
        );

        println!("TypeScript types generated in {:?}", output_dir);
    }
}
