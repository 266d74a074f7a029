//! Static message tables, keyed by dotted message ids.

use once_cell::sync::Lazy;
use std::collections::HashMap;

type Table = HashMap<&'static str, &'static str>;

pub(super) static RU: Lazy<Table> = Lazy::new(|| {
    HashMap::from([
        ("notes.title", "Заметки"),
        ("notes.newNote", "Новая заметка"),
        ("notes.noTitle", "Без названия"),
        ("notes.emptyNote", "Пустая заметка"),
        ("notes.empty", "Заметок пока нет"),
        ("notes.emptySubtitle", "Создайте первую заметку"),
        ("notes.selectOrCreate", "Выберите заметку или создайте новую"),
        ("editor.titlePlaceholder", "Заголовок"),
        ("editor.contentPlaceholder", "Начните писать..."),
        ("editor.tags", "Теги"),
        ("editor.tagsPlaceholder", "Добавить тег"),
        ("editor.addTag", "Добавить"),
        ("editor.encryptNote", "Зашифровать заметку"),
        ("editor.encrypted", "Зашифрованная заметка"),
        ("editor.save", "Сохранить"),
        ("editor.cancel", "Отмена"),
        ("password.title", "Пароль"),
        ("password.placeholder", "Введите пароль"),
        ("password.confirmPlaceholder", "Повторите пароль"),
        ("password.create", "Создать"),
        ("password.unlock", "Открыть"),
        ("password.cancel", "Отмена"),
        ("password.required", "Введите пароль"),
        ("password.minLength", "Пароль должен быть не короче 6 символов"),
        ("password.mismatch", "Пароли не совпадают"),
        ("password.error", "Неверный пароль"),
        ("filters.title", "Фильтры"),
        ("filters.all", "Все"),
        ("filters.encrypted", "Зашифрованные"),
        ("filters.unencrypted", "Открытые"),
        ("filters.tags", "Теги"),
        ("filters.searchTags", "Поиск тегов"),
        ("filters.noTags", "Тегов нет"),
        ("filters.noTagsFound", "Теги не найдены"),
        ("filters.clear", "Сбросить"),
        ("errors.saveFailed", "Не удалось сохранить заметку"),
        ("errors.deleteFailed", "Не удалось удалить заметку"),
    ])
});

pub(super) static EN: Lazy<Table> = Lazy::new(|| {
    HashMap::from([
        ("notes.title", "Notes"),
        ("notes.newNote", "New note"),
        ("notes.noTitle", "Untitled"),
        ("notes.emptyNote", "Empty note"),
        ("notes.empty", "No notes yet"),
        ("notes.emptySubtitle", "Create your first note"),
        ("notes.selectOrCreate", "Select a note or create a new one"),
        ("editor.titlePlaceholder", "Title"),
        ("editor.contentPlaceholder", "Start writing..."),
        ("editor.tags", "Tags"),
        ("editor.tagsPlaceholder", "Add a tag"),
        ("editor.addTag", "Add"),
        ("editor.encryptNote", "Encrypt note"),
        ("editor.encrypted", "Encrypted note"),
        ("editor.save", "Save"),
        ("editor.cancel", "Cancel"),
        ("password.title", "Password"),
        ("password.placeholder", "Enter password"),
        ("password.confirmPlaceholder", "Confirm password"),
        ("password.create", "Create"),
        ("password.unlock", "Unlock"),
        ("password.cancel", "Cancel"),
        ("password.required", "Password is required"),
        ("password.minLength", "Password must be at least 6 characters"),
        ("password.mismatch", "Passwords do not match"),
        ("password.error", "Incorrect password"),
        ("filters.title", "Filters"),
        ("filters.all", "All"),
        ("filters.encrypted", "Encrypted"),
        ("filters.unencrypted", "Unencrypted"),
        ("filters.tags", "Tags"),
        ("filters.searchTags", "Search tags"),
        ("filters.noTags", "No tags"),
        ("filters.noTagsFound", "No tags found"),
        ("filters.clear", "Clear"),
        ("errors.saveFailed", "Failed to save the note"),
        ("errors.deleteFailed", "Failed to delete the note"),
    ])
});
