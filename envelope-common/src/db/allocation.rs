use chrono::Utc;
use diesel::{BoolExpressionMethods, ExpressionMethods, QueryDsl, RunQueryDsl};
use uuid::Uuid;

use crate::db::{Dao, DaoError};
use crate::models::allocation::{Allocation, AllocationChangeset, NewAllocation};
use crate::request_io::{AllocationUpdate, InputAllocation};
use crate::schema::allocations as allocation_fields;
use crate::schema::allocations::dsl::allocations;
use crate::store::{AllocationStore, EnvelopePath};

impl AllocationStore for Dao {
    fn create_allocation(
        &self,
        path: &EnvelopePath,
        allocation: &InputAllocation,
    ) -> Result<Allocation, DaoError> {
        let now = Utc::now();

        let new_allocation = NewAllocation {
            id: Uuid::now_v7(),
            envelope_id: path.envelope_id(),
            month: allocation.month,
            year: allocation.year,
            amount: allocation.amount,
            created_timestamp: now,
            modified_timestamp: now,
        };

        // A second allocation for the same envelope and month hits the unique index and comes
        // back as a UniqueViolation
        Ok(diesel::insert_into(allocations)
            .values(&new_allocation)
            .get_result::<Allocation>(&mut self.conn()?)?)
    }

    fn get_allocation(
        &self,
        path: &EnvelopePath,
        allocation_id: Uuid,
    ) -> Result<Allocation, DaoError> {
        Ok(allocations
            .filter(
                allocation_fields::id
                    .eq(allocation_id)
                    .and(allocation_fields::envelope_id.eq(path.envelope_id())),
            )
            .get_result::<Allocation>(&mut self.conn()?)?)
    }

    fn get_allocations(&self, path: &EnvelopePath) -> Result<Vec<Allocation>, DaoError> {
        Ok(allocations
            .filter(allocation_fields::envelope_id.eq(path.envelope_id()))
            .order((allocation_fields::year, allocation_fields::month))
            .load::<Allocation>(&mut self.conn()?)?)
    }

    fn update_allocation(
        &self,
        path: &EnvelopePath,
        allocation_id: Uuid,
        update: &AllocationUpdate,
    ) -> Result<Allocation, DaoError> {
        let changeset = AllocationChangeset {
            month: update.month,
            year: update.year,
            amount: update.amount,
            modified_timestamp: Utc::now(),
        };

        Ok(diesel::update(allocations)
            .filter(
                allocation_fields::id
                    .eq(allocation_id)
                    .and(allocation_fields::envelope_id.eq(path.envelope_id())),
            )
            .set(&changeset)
            .get_result::<Allocation>(&mut self.conn()?)?)
    }

    fn delete_allocation(
        &self,
        path: &EnvelopePath,
        allocation_id: Uuid,
    ) -> Result<(), DaoError> {
        let deleted = diesel::delete(allocations)
            .filter(
                allocation_fields::id
                    .eq(allocation_id)
                    .and(allocation_fields::envelope_id.eq(path.envelope_id())),
            )
            .execute(&mut self.conn()?)?;

        if deleted == 0 {
            return Err(DaoError::QueryFailure(diesel::result::Error::NotFound));
        }

        Ok(())
    }
}
