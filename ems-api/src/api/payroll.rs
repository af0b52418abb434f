use rocket::serde::json::Json;
use rocket::{Route, State};

use crate::auth_guards::HrUser;
use crate::broadcaster::{Broadcaster, Topic};
use crate::error::ApiResult;
use crate::logged_json::LoggedJson;
use crate::models::SalaryStructureView;
use crate::orm::DbConn;
use crate::orm::payroll::{save_structure, structure_for};

#[get("/1/payroll/structure/<employee_id>")]
pub async fn structure(
    db: DbConn,
    auth: HrUser,
    employee_id: i32,
) -> ApiResult<Json<SalaryStructureView>> {
    let company_id = auth.company_id();
    Ok(Json(
        db.run(move |conn| structure_for(conn, company_id, employee_id))
            .await?,
    ))
}

/// Upserts the structure. The employee's salary becomes the new gross.
#[post("/1/payroll/structure", data = "<input>")]
pub async fn save(
    db: DbConn,
    auth: HrUser,
    bus: &State<Broadcaster>,
    input: LoggedJson<SalaryStructureView>,
) -> ApiResult<Json<SalaryStructureView>> {
    let input = input.into_inner();
    let company_id = auth.company_id();
    let saved = db
        .run(move |conn| save_structure(conn, company_id, input))
        .await?;
    info!(
        "Salary structure of employee {} saved, gross {:.2}",
        saved.employee_id, saved.gross_salary
    );
    bus.publish(Topic::PayrollUpdated);
    Ok(Json(saved))
}

pub fn routes() -> Vec<Route> {
    routes![structure, save]
}
