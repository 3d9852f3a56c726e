use error_stack::Report;

use kernel::interface::query::BookQuery;
use kernel::interface::update::BookModifier;
use kernel::prelude::entity::{Book, BookId, SelectLimit, SelectOffset};
use kernel::KernelError;

use crate::database::memory::InMemoryTransaction;

pub struct InMemoryBookRepository;

#[async_trait::async_trait]
impl BookQuery for InMemoryBookRepository {
    type Transaction = InMemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        Ok(con.state().books.get(id).cloned())
    }

    async fn find_by_id_for_update(
        &self,
        con: &mut InMemoryTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        Ok(con.state().books.get(id).cloned())
    }

    async fn find_by_ids(
        &self,
        con: &mut InMemoryTransaction,
        ids: &[BookId],
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        let books = &con.state().books;
        Ok(ids.iter().filter_map(|id| books.get(id).cloned()).collect())
    }

    async fn find_all(
        &self,
        con: &mut InMemoryTransaction,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        let mut books = con.state().books.values().cloned().collect::<Vec<_>>();
        books.sort_by(|a, b| {
            let a: &String = a.title().as_ref();
            let b: &String = b.title().as_ref();
            a.cmp(b)
        });
        let offset = usize::try_from(*offset.as_ref()).unwrap_or(0);
        let limit = usize::try_from(*limit.as_ref()).unwrap_or(0);
        Ok(books.into_iter().skip(offset).take(limit).collect())
    }
}

#[async_trait::async_trait]
impl BookModifier for InMemoryBookRepository {
    type Transaction = InMemoryTransaction;

    async fn create(
        &self,
        con: &mut InMemoryTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        let books = &mut con.state_mut().books;
        if books.contains_key(book.id()) {
            return Err(Report::new(KernelError::Internal)
                .attach_printable(format!("Book {:?} already exists", book.id())));
        }
        books.insert(*book.id(), book.clone());
        Ok(())
    }

    async fn update(
        &self,
        con: &mut InMemoryTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        if let Some(stored) = con.state_mut().books.get_mut(book.id()) {
            *stored = book.clone();
        }
        Ok(())
    }

    async fn delete(
        &self,
        con: &mut InMemoryTransaction,
        book_id: &BookId,
    ) -> error_stack::Result<(), KernelError> {
        let state = con.state_mut();
        state.books.remove(book_id);
        state
            .borrowings
            .retain(|_, borrowing| borrowing.book_id() != book_id);
        Ok(())
    }

    async fn decrement_inventory(
        &self,
        con: &mut InMemoryTransaction,
        book_id: &BookId,
    ) -> error_stack::Result<bool, KernelError> {
        let Some(book) = con.state_mut().books.get_mut(book_id) else {
            return Ok(false);
        };
        let Some(remaining) = book.inventory().taken() else {
            return Ok(false);
        };
        book.substitute(|book| *book.inventory = remaining);
        Ok(true)
    }

    async fn increment_inventory(
        &self,
        con: &mut InMemoryTransaction,
        book_id: &BookId,
    ) -> error_stack::Result<(), KernelError> {
        let book = con.state_mut().books.get_mut(book_id).ok_or_else(|| {
            Report::new(KernelError::NotFound)
                .attach_printable(format!("Book {:?} vanished while restoring inventory", book_id))
        })?;
        let restored = book.inventory().restored();
        book.substitute(|book| *book.inventory = restored);
        Ok(())
    }
}
